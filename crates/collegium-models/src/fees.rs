//! Fee entry models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{FeeId, StudentId};
use crate::status::FeeStatus;

/// A charge against a student. `paid_on` is set only on the transition to
/// `FeeStatus::Paid`; settled fees (paid, waived) are terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Fee {
    pub id: FeeId,
    pub student_id: StudentId,
    pub fee_type: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub status: FeeStatus,
}

/// Insert record for a fee; status starts at `Due`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFee {
    pub student_id: StudentId,
    pub fee_type: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}
