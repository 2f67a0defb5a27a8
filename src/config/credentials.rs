use std::env;

use bcrypt::DEFAULT_COST;

/// Password policy for account creation.
#[derive(Clone, Debug)]
pub struct CredentialPolicy {
    pub min_password_len: usize,
    pub bcrypt_cost: u32,
}

impl CredentialPolicy {
    pub fn from_env() -> Self {
        Self {
            min_password_len: env::var("COLLEGIUM_MIN_PASSWORD_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
            bcrypt_cost: env::var("COLLEGIUM_BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_COST),
        }
    }
}
