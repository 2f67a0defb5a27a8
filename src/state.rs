use std::sync::Arc;

use collegium_core::StoreError;
use collegium_store::Storage;

use crate::config::credentials::CredentialPolicy;
use crate::config::database::init_storage;
use crate::config::lending::LendingPolicy;
use crate::utils::password::{BcryptHasher, CredentialHasher};

/// Shared application state: the storage backend, the credential hasher, and
/// the policies the domain services consult.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub lending: LendingPolicy,
    pub credentials: CredentialPolicy,
}

pub async fn init_app_state() -> Result<AppState, StoreError> {
    let credentials = CredentialPolicy::from_env();

    Ok(AppState {
        storage: Arc::new(init_storage().await?),
        hasher: Arc::new(BcryptHasher::new(credentials.bcrypt_cost)),
        lending: LendingPolicy::from_env(),
        credentials,
    })
}
