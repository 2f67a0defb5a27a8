//! Error taxonomy for domain operations.
//!
//! Every domain operation returns `Result<T, OperationError>`. The variants
//! are deliberate: validation, not-found, conflict, and unavailable are
//! expected business outcomes a caller can match on and recover from;
//! `Infrastructure` is the opaque "the storage backend failed" case that is
//! logged in full and surfaced without detail.

use thiserror::Error;

/// A field-level validation failure.
///
/// Produced by the pure validators in [`crate::validate`] before any storage
/// round trip happens. `field` names the offending input field; `reason` is a
/// human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// An opaque storage-backend failure (connection, commit, rollback, timeout).
///
/// The full causal chain is preserved for logging; callers are not expected
/// to match on its contents.
#[derive(Debug, Error)]
#[error("storage backend failure: {0}")]
pub struct StoreError(#[from] anyhow::Error);

impl StoreError {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(anyhow::Error::new(err))
    }

    pub fn msg(msg: impl Into<String>) -> Self {
        Self(anyhow::anyhow!(msg.into()))
    }
}

/// The discriminated result type of every domain operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Caller-supplied data is malformed or out of range. Never touches
    /// storage; always recoverable by the caller.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced entity id does not resolve.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A business-level precondition failed: duplicate key, already-returned
    /// loan, already-paid fee. Never retried automatically.
    #[error("{0}")]
    Conflict(String),

    /// Resource-specific exhaustion, e.g. no copies left to lend.
    #[error("{0}")]
    Unavailable(String),

    /// The storage backend failed. The transaction is guaranteed to have
    /// been rolled back before this propagates.
    #[error(transparent)]
    Infrastructure(#[from] StoreError),
}

impl OperationError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, reason))
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
