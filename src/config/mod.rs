//! Configuration modules.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables with sensible defaults:
//!
//! - [`credentials`]: password policy and bcrypt work factor
//! - [`database`]: PostgreSQL-backed storage initialization
//! - [`lending`]: library fine policy

pub mod credentials;
pub mod database;
pub mod lending;
