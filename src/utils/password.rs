use bcrypt::{DEFAULT_COST, hash, verify};

use collegium_core::StoreError;

/// Hashes and checks account passwords.
///
/// The rest of the system treats the hash as an opaque string; this trait is
/// the only place plaintext passwords are handled. Failures are surfaced as
/// [`StoreError`] like any other collaborator failure.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, StoreError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, StoreError>;
}

/// bcrypt-backed hasher with a configurable work factor.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, StoreError> {
        hash(password, self.cost).map_err(StoreError::new)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, StoreError> {
        verify(password, hash).map_err(StoreError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// bcrypt's minimum cost factor, kept private by the bcrypt crate.
    const MIN_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hasher = BcryptHasher::new(MIN_COST);
        let hashed = hasher.hash("correct horse").unwrap();
        assert!(hasher.verify("correct horse", &hashed).unwrap());
        assert!(!hasher.verify("wrong horse", &hashed).unwrap());
    }
}
