use chrono::{NaiveDate, Utc};
use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{Fee, FeeId, FeeStatus, NewFee, StudentId};
use collegium_store::{Storage, run_atomic};

pub struct FeeService;

impl FeeService {
    /// Raises a charge against a student. New fees always start out `Due`.
    #[instrument(skip(storage, fee))]
    pub async fn charge_fee(storage: &dyn Storage, fee: NewFee) -> Result<Fee, OperationError> {
        let fee = NewFee {
            student_id: fee.student_id,
            fee_type: validate::non_empty("fee_type", &fee.fee_type)?,
            amount: validate::positive_f64("amount", fee.amount)?,
            due_date: fee.due_date,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(fee.student_id).await? {
                    return Err(OperationError::not_found("student", fee.student_id));
                }
                Ok(uow.insert_fee(fee).await?)
            })
        })
        .await
    }

    /// Settles a fee. Both open states (due, overdue) accept payment; a fee
    /// that was already paid or waived stays untouched and the attempt is
    /// reported as a conflict.
    #[instrument(skip(storage))]
    pub async fn pay_fee(
        storage: &dyn Storage,
        fee_id: FeeId,
        paid_on: NaiveDate,
    ) -> Result<Fee, OperationError> {
        let today = Utc::now().date_naive();
        let paid_on = validate::not_in_future("paid_on", paid_on, today)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(fee) = uow.find_fee(fee_id).await? else {
                    return Err(OperationError::not_found("fee", fee_id));
                };
                match fee.status {
                    FeeStatus::Paid => {
                        return Err(OperationError::conflict(format!(
                            "fee {fee_id} is already paid"
                        )));
                    }
                    FeeStatus::Waived => {
                        return Err(OperationError::conflict(format!(
                            "fee {fee_id} was waived"
                        )));
                    }
                    FeeStatus::Due | FeeStatus::Overdue => {}
                }

                uow.set_fee_status(fee_id, FeeStatus::Paid, Some(paid_on)).await?;
                Ok(Fee {
                    status: FeeStatus::Paid,
                    paid_on: Some(paid_on),
                    ..fee
                })
            })
        })
        .await
    }

    /// Forgives an open fee. Settled fees cannot be waived.
    #[instrument(skip(storage))]
    pub async fn waive_fee(storage: &dyn Storage, fee_id: FeeId) -> Result<Fee, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(fee) = uow.find_fee(fee_id).await? else {
                    return Err(OperationError::not_found("fee", fee_id));
                };
                if fee.status.is_settled() {
                    return Err(OperationError::conflict(format!(
                        "fee {fee_id} is already settled as {}",
                        fee.status
                    )));
                }

                uow.set_fee_status(fee_id, FeeStatus::Waived, None).await?;
                Ok(Fee {
                    status: FeeStatus::Waived,
                    paid_on: None,
                    ..fee
                })
            })
        })
        .await
    }

    /// Escalates a due fee whose due date has passed. Any other state, or a
    /// due date that has not passed yet, is a conflict.
    #[instrument(skip(storage))]
    pub async fn mark_fee_overdue(
        storage: &dyn Storage,
        fee_id: FeeId,
        today: NaiveDate,
    ) -> Result<Fee, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(fee) = uow.find_fee(fee_id).await? else {
                    return Err(OperationError::not_found("fee", fee_id));
                };
                if !fee.status.can_transition_to(FeeStatus::Overdue) {
                    return Err(OperationError::conflict(format!(
                        "fee {fee_id} is {} and cannot become overdue",
                        fee.status
                    )));
                }
                if fee.due_date >= today {
                    return Err(OperationError::conflict(format!(
                        "fee {fee_id} is not past its due date"
                    )));
                }

                uow.set_fee_status(fee_id, FeeStatus::Overdue, None).await?;
                Ok(Fee {
                    status: FeeStatus::Overdue,
                    ..fee
                })
            })
        })
        .await
    }

    /// Every fee charged to one student, oldest due date first.
    #[instrument(skip(storage))]
    pub async fn fees_for_student(
        storage: &dyn Storage,
        student_id: StudentId,
    ) -> Result<Vec<Fee>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(student_id).await? {
                    return Err(OperationError::not_found("student", student_id));
                }
                Ok(uow.fees_for_student(student_id).await?)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collegium_models::{NewAccount, NewStudent, Role};
    use collegium_store::MemoryStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_student(storage: &MemoryStorage) -> StudentId {
        let mut uow = storage.begin().await.unwrap();
        let program = uow.insert_program("History BA").await.unwrap();
        let account = uow
            .insert_account(NewAccount {
                username: "lena.fischer@example.edu".to_string(),
                password_hash: "x".to_string(),
                role: Role::Student,
            })
            .await
            .unwrap();
        let student = uow
            .insert_student(
                account.id,
                NewStudent {
                    program_id: program.id,
                    first_name: "Lena".to_string(),
                    last_name: "Fischer".to_string(),
                    date_of_birth: date(2003, 11, 2),
                    gender: None,
                    email: "lena.fischer@example.edu".to_string(),
                    phone: None,
                    address: None,
                    enrollment_date: date(2021, 8, 1),
                    major: None,
                },
            )
            .await
            .unwrap();
        uow.commit().await.unwrap();
        student.id
    }

    async fn charge(storage: &MemoryStorage, student_id: StudentId, due: NaiveDate) -> Fee {
        FeeService::charge_fee(
            storage,
            NewFee {
                student_id,
                fee_type: "tuition".to_string(),
                amount: 1200.0,
                due_date: due,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_charge_fee_starts_due_and_checks_student() {
        let storage = MemoryStorage::new();
        let student_id = seed_student(&storage).await;

        let fee = charge(&storage, student_id, date(2026, 3, 1)).await;
        assert_eq!(fee.status, FeeStatus::Due);
        assert_eq!(fee.paid_on, None);

        let err = FeeService::charge_fee(
            &storage,
            NewFee {
                student_id: StudentId::new(),
                fee_type: "tuition".to_string(),
                amount: 1200.0,
                due_date: date(2026, 3, 1),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "student", .. }));

        let err = FeeService::charge_fee(
            &storage,
            NewFee {
                student_id,
                fee_type: "tuition".to_string(),
                amount: -5.0,
                due_date: date(2026, 3, 1),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "amount"));
    }

    #[tokio::test]
    async fn test_pay_fee_settles_once() {
        let storage = MemoryStorage::new();
        let student_id = seed_student(&storage).await;
        let fee = charge(&storage, student_id, date(2026, 3, 1)).await;
        let paid_on = Utc::now().date_naive();

        let paid = FeeService::pay_fee(&storage, fee.id, paid_on).await.unwrap();
        assert_eq!(paid.status, FeeStatus::Paid);
        assert_eq!(paid.paid_on, Some(paid_on));

        let err = FeeService::pay_fee(&storage, fee.id, paid_on).await.unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        let fees = FeeService::fees_for_student(&storage, student_id).await.unwrap();
        assert_eq!(fees.len(), 1);
        assert_eq!(fees[0].status, FeeStatus::Paid);
    }

    #[tokio::test]
    async fn test_waive_fee_rejects_settled() {
        let storage = MemoryStorage::new();
        let student_id = seed_student(&storage).await;

        let fee = charge(&storage, student_id, date(2026, 3, 1)).await;
        let waived = FeeService::waive_fee(&storage, fee.id).await.unwrap();
        assert_eq!(waived.status, FeeStatus::Waived);
        assert_eq!(waived.paid_on, None);

        let err = FeeService::waive_fee(&storage, fee.id).await.unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        let err = FeeService::pay_fee(&storage, fee.id, Utc::now().date_naive())
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        let paid = charge(&storage, student_id, date(2026, 3, 1)).await;
        FeeService::pay_fee(&storage, paid.id, Utc::now().date_naive()).await.unwrap();
        let err = FeeService::waive_fee(&storage, paid.id).await.unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_mark_fee_overdue_requires_lapsed_due_date() {
        let storage = MemoryStorage::new();
        let student_id = seed_student(&storage).await;
        let fee = charge(&storage, student_id, date(2026, 3, 1)).await;

        // Due date not yet passed.
        let err = FeeService::mark_fee_overdue(&storage, fee.id, date(2026, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        let overdue = FeeService::mark_fee_overdue(&storage, fee.id, date(2026, 3, 2))
            .await
            .unwrap();
        assert_eq!(overdue.status, FeeStatus::Overdue);

        // Already overdue.
        let err = FeeService::mark_fee_overdue(&storage, fee.id, date(2026, 3, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        // Overdue fees still accept payment.
        let paid = FeeService::pay_fee(&storage, fee.id, Utc::now().date_naive())
            .await
            .unwrap();
        assert_eq!(paid.status, FeeStatus::Paid);
    }

    #[tokio::test]
    async fn test_unknown_fee_is_not_found() {
        let storage = MemoryStorage::new();
        seed_student(&storage).await;

        let err = FeeService::pay_fee(&storage, FeeId::new(), Utc::now().date_naive())
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "fee", .. }));

        let err = FeeService::fees_for_student(&storage, StudentId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "student", .. }));
    }
}
