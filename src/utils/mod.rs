//! Shared utilities.
//!
//! - [`password`]: credential hashing behind the [`password::CredentialHasher`] trait

pub mod password;
