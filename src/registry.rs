//! Wiring from configuration to a ready-to-use [`Gate`].

use std::sync::Arc;

use crate::auth::{self, CredentialStore, TokenService};
use crate::binstore;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::gate::Gate;
use crate::manager::StoreManager;
use crate::metastore;

pub struct Registry {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<dyn CredentialStore>,
    pub store: Arc<StoreManager>,
    pub gate: Arc<Gate>,
}

impl Registry {
    /// Opens every backend named in `config`. The config is expected to have
    /// been validated already.
    pub fn open(config: &RegistryConfig) -> Result<Self> {
        let tokens = Arc::new(TokenService::new(
            config.signing_key.as_bytes().to_vec(),
            config.token_ttl(),
        ));

        let auth = open_credentials(config, Arc::clone(&tokens))?;
        let bin = binstore::resolver().resolve(&config.binstore_path)?;
        let meta = metastore::resolver().resolve(&config.metastore_path)?;
        let store = Arc::new(StoreManager::new(bin, meta));

        let gate = Arc::new(Gate::new(
            Arc::clone(&auth),
            Arc::clone(&store),
            Arc::clone(&tokens),
        ));

        Ok(Self {
            tokens,
            auth,
            store,
            gate,
        })
    }
}

/// Opens only the credential backend, for commands that manage users.
pub fn open_credentials(
    config: &RegistryConfig,
    tokens: Arc<TokenService>,
) -> Result<Arc<dyn CredentialStore>> {
    auth::resolver(tokens).resolve(&config.auth_path)
}
