//! Authentication: credential backends, password hashing and identity tokens.

mod password;
mod token;
mod userpass;

use std::sync::Arc;

pub use password::{MIN_PASSWORD_LEN, PasswordHasher, validate_credentials};
pub use token::{Claims, ISSUER, TokenService};
pub use userpass::UserPassAuth;

use crate::error::Result;
use crate::resolver::Resolver;
use crate::types::User;

/// CredentialStore manages user records and turns valid credentials into
/// tokens.
pub trait CredentialStore: Send + Sync {
    /// Checks the password and, on success, issues a token for the user.
    fn login(&self, username: &str, password: &str) -> Result<String>;

    fn add_user(&self, user: &User) -> Result<()>;

    /// Replaces the record stored under `username`.
    fn update_user(&self, username: &str, user: &User) -> Result<()>;

    fn set_password(&self, username: &str, password: &str) -> Result<()>;

    fn get_user(&self, username: &str) -> Result<User>;

    fn list_users(&self) -> Result<Vec<User>>;

    fn delete_user(&self, username: &str) -> Result<()>;
}

/// Resolver for `userpass://` credential stores. Every store it builds signs
/// tokens with `tokens`.
#[must_use]
pub fn resolver(tokens: Arc<TokenService>) -> Resolver<Arc<dyn CredentialStore>> {
    Resolver::new("auth").register("userpass", move |addr| {
        Ok(Arc::new(UserPassAuth::open(addr, Arc::clone(&tokens))?) as Arc<dyn CredentialStore>)
    })
}
