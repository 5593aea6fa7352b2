//! The policy decision point in front of the store manager.
//!
//! Every operation resolves the caller's identity from a token, loads the
//! target import, decides with [`can_user`], and only then touches storage.
//! The import is loaded before the decision, so a caller without access can
//! still tell a missing import (`NotFound`) from a forbidden one
//! (`NotAuthorized`).

use std::sync::Arc;

use crate::auth::{CredentialStore, TokenService};
use crate::error::{Error, Result};
use crate::manager::StoreManager;
use crate::types::{Access, Identity, Import, Version};

/// Decides whether `identity` may perform `access` on `import`.
pub fn can_user(identity: &Identity, import: &Import, access: Access) -> Result<()> {
    let user = match identity {
        Identity::Anonymous => {
            return if access == Access::Read && !import.private {
                Ok(())
            } else {
                Err(Error::NotAuthorized)
            };
        }
        Identity::Authenticated(user) => user,
    };

    if user.disabled {
        return Err(Error::NotAuthorized);
    }
    if user.admin {
        return Ok(());
    }

    let permitted = match access {
        Access::Write => import.is_owner(&user.username),
        Access::Read if import.private => {
            import.is_owner(&user.username) || import.is_reader(&user.username)
        }
        Access::Read => true,
    };

    if permitted {
        Ok(())
    } else {
        Err(Error::NotAuthorized)
    }
}

pub struct Gate {
    auth: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    store: Arc<StoreManager>,
}

impl Gate {
    #[must_use]
    pub fn new(
        auth: Arc<dyn CredentialStore>,
        store: Arc<StoreManager>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            auth,
            tokens,
            store,
        }
    }

    /// Exchanges credentials for a token. No existing token is needed.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        self.auth.login(username, password)
    }

    /// An empty token is an anonymous caller; a bad token is an error.
    pub fn parse_token(&self, token: &str) -> Result<Identity> {
        if token.is_empty() {
            return Ok(Identity::Anonymous);
        }

        let username = self.tokens.validate(token)?;
        let user = self.auth.get_user(&username)?;
        Ok(Identity::Authenticated(user))
    }

    /// Resolves the caller and the import, then checks `access`.
    fn authorize(&self, token: &str, url: &str, access: Access) -> Result<(Identity, Import)> {
        let identity = self.parse_token(token)?;
        let import = self.store.get(url)?;
        if let Err(e) = can_user(&identity, &import, access) {
            tracing::debug!("Denied {} access to '{}' for {}", access, url, identity);
            return Err(e);
        }
        Ok((identity, import))
    }

    /// Publishes a version. For an import that does not exist yet, the
    /// submitted import record is what gets authorized, so the publisher has
    /// to list themselves as an owner.
    pub fn add(&self, token: &str, import: &Import, version: &Version, content: &[u8]) -> Result<()> {
        let identity = self.parse_token(token)?;
        let target = match self.store.get(&import.url) {
            Ok(existing) => existing,
            Err(Error::NotFound) => import.clone(),
            Err(e) => return Err(e),
        };
        can_user(&identity, &target, Access::Write)?;

        tracing::debug!("{} publishing {}@{}", identity, import.url, version.name);
        self.store.add(&target, version, content)
    }

    pub fn update_import(&self, token: &str, import: &Import) -> Result<()> {
        self.authorize(token, &import.url, Access::Write)?;
        self.store.update_import(import)
    }

    pub fn get(&self, token: &str, url: &str) -> Result<Import> {
        let (_, import) = self.authorize(token, url, Access::Read)?;
        Ok(import)
    }

    pub fn get_versions(&self, token: &str, url: &str) -> Result<Vec<Version>> {
        self.authorize(token, url, Access::Read)?;
        self.store.get_versions(url)
    }

    pub fn get_version(&self, token: &str, url: &str, name: &str) -> Result<Version> {
        self.authorize(token, url, Access::Read)?;
        self.store.get_version(url, name)
    }

    /// Returns the archive for a version (latest when `name` is empty).
    /// Disabled imports and versions are only served to callers with write
    /// access.
    pub fn get_version_binary(&self, token: &str, url: &str, name: &str) -> Result<Vec<u8>> {
        let (identity, import) = self.authorize(token, url, Access::Read)?;
        let version = self.store.get_version(url, name)?;

        if (!import.enabled || !version.enabled)
            && can_user(&identity, &import, Access::Write).is_err()
        {
            return Err(Error::Disabled);
        }

        self.store.get_version_binary(&version)
    }

    pub fn delete_import(&self, token: &str, url: &str) -> Result<()> {
        let (identity, _) = self.authorize(token, url, Access::Write)?;
        tracing::info!("{} deleting import {}", identity, url);
        self.store.delete_import(url)
    }

    pub fn delete_version(&self, token: &str, url: &str, name: &str) -> Result<()> {
        let (identity, _) = self.authorize(token, url, Access::Write)?;
        tracing::info!("{} deleting version {}@{}", identity, url, name);
        self.store.delete_version(url, name)
    }

    pub fn disable_import(&self, token: &str, url: &str) -> Result<()> {
        self.authorize(token, url, Access::Write)?;
        self.store.disable_import(url)
    }

    pub fn disable_version(&self, token: &str, url: &str, name: &str) -> Result<()> {
        self.authorize(token, url, Access::Write)?;
        self.store.disable_version(url, name)
    }

    pub fn enable_import(&self, token: &str, url: &str) -> Result<()> {
        self.authorize(token, url, Access::Write)?;
        self.store.enable_import(url)
    }

    pub fn enable_version(&self, token: &str, url: &str, name: &str) -> Result<()> {
        self.authorize(token, url, Access::Write)?;
        self.store.enable_version(url, name)
    }
}
