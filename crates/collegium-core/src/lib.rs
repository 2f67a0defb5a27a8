//! # Collegium Core
//!
//! Error taxonomy and validation utilities for the collegium records core.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - [`error`]: the discriminated error taxonomy domain operations return
//! - [`validate`]: pure, side-effect-free field validators
//!
//! # Example
//!
//! ```ignore
//! use collegium_core::{OperationError, validate};
//!
//! let name = validate::non_empty("first_name", "  Ada ")?;
//! assert_eq!(name, "Ada");
//!
//! let err = OperationError::not_found("student", some_id);
//! ```

pub mod error;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{OperationError, StoreError, ValidationError};
