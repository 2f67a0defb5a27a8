//! Transaction coordinator.
//!
//! Every domain operation is exactly one [`run_atomic`] call: begin a unit
//! of work, run the operation body against it, commit on success, roll back
//! on failure. The body receives the unit of work rather than the storage,
//! so it cannot open a nested transaction.

use collegium_core::OperationError;
use futures::future::BoxFuture;

use crate::traits::{Storage, UnitOfWork};

/// Runs `work` inside a single transaction.
///
/// On `Ok` the unit of work is committed; a commit failure surfaces as
/// [`OperationError::Infrastructure`]. On `Err` the unit of work is rolled
/// back and the original error is returned; a rollback failure is logged and
/// never replaces the error that caused it.
///
/// The closure must move its captures: the unit of work only borrows for the
/// duration of the body.
pub async fn run_atomic<T, F>(storage: &dyn Storage, work: F) -> Result<T, OperationError>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn UnitOfWork) -> BoxFuture<'t, Result<T, OperationError>> + Send,
{
    let mut uow = storage.begin().await?;
    match work(uow.as_mut()).await {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed after aborted transaction");
            }
            Err(err)
        }
    }
}
