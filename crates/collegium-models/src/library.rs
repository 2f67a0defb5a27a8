//! Library catalog and lending ledger models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{BookId, LoanId, StudentId};

/// A title in the library catalog together with its copy counts.
///
/// `available_copies` is the single cross-operation shared counter in the
/// system: it always satisfies `0 <= available <= total`, and
/// `total - available` equals the number of open loans. Only the lending
/// ledger mutates it; metadata updates never touch either count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub added_at: DateTime<Utc>,
}

/// Insert record for a book; available copies start equal to total.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
    pub total_copies: i32,
}

/// Metadata-only book update; only provided fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
}

/// A lending ledger entry. Open while `return_date` is unset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub student_id: StudentId,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine: f64,
}

impl Loan {
    /// Whether the copy is still out.
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whole days past the due date as of `on`; zero when on time.
    pub fn days_overdue(&self, on: NaiveDate) -> i64 {
        (on - self.due_date).num_days().max(0)
    }
}

/// Insert record for an open loan.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLoan {
    pub book_id: BookId,
    pub student_id: StudentId,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}
