use std::path::Path;
use std::sync::Arc;

use super::password::{PasswordHasher, validate_credentials};
use super::{CredentialStore, TokenService};
use crate::error::{Error, Result};
use crate::store::SqliteKv;
use crate::types::User;

const BUCKET: &str = "dep-reg-auth";
const USER_PREFIX: &str = "user/";
const PASSWORD_PREFIX: &str = "pass/";

fn user_key(username: &str) -> String {
    format!("{USER_PREFIX}{username}")
}

fn password_key(username: &str) -> String {
    format!("{PASSWORD_PREFIX}{username}")
}

/// Username/password authentication backed by the embedded key-value store.
///
/// A user's profile and password hash are separate keys, so a profile can
/// exist without a password (no login possible) and vice versa.
pub struct UserPassAuth {
    db: SqliteKv,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl UserPassAuth {
    pub fn open<P: AsRef<Path>>(db_path: P, tokens: Arc<TokenService>) -> Result<Self> {
        Ok(Self::new(SqliteKv::open(db_path)?, tokens))
    }

    #[must_use]
    pub fn new(db: SqliteKv, tokens: Arc<TokenService>) -> Self {
        Self {
            db,
            tokens,
            hasher: PasswordHasher::new(),
        }
    }
}

impl CredentialStore for UserPassAuth {
    fn login(&self, username: &str, password: &str) -> Result<String> {
        validate_credentials(username, password)?;

        let key = password_key(username);
        let hash = self
            .db
            .view(BUCKET, |b| b.get(&key))?
            .ok_or(Error::UserDoesNotExist)?;
        let hash = String::from_utf8(hash)
            .map_err(|_| Error::PasswordHash("stored hash is not valid UTF-8".to_string()))?;

        self.hasher.verify(password, &hash)?;
        self.tokens.generate(username)
    }

    fn add_user(&self, user: &User) -> Result<()> {
        if user.username.is_empty() {
            return Err(Error::UsernameEmpty);
        }

        let key = user_key(&user.username);
        self.db.update(BUCKET, |b| {
            if b.contains(&key)? {
                return Err(Error::UserAlreadyExists);
            }
            b.put_json(&key, user)
        })
    }

    fn update_user(&self, username: &str, user: &User) -> Result<()> {
        if username.is_empty() {
            return Err(Error::UsernameEmpty);
        }

        let record = User {
            username: username.to_string(),
            ..user.clone()
        };
        let key = user_key(username);
        self.db.update(BUCKET, |b| {
            if !b.contains(&key)? {
                return Err(Error::UserDoesNotExist);
            }
            b.put_json(&key, &record)
        })
    }

    fn set_password(&self, username: &str, password: &str) -> Result<()> {
        validate_credentials(username, password)?;

        let hash = self.hasher.hash(password)?;
        let key = password_key(username);
        self.db.update(BUCKET, |b| b.put(&key, hash.as_bytes()))
    }

    fn get_user(&self, username: &str) -> Result<User> {
        if username.is_empty() {
            return Err(Error::UsernameEmpty);
        }

        let key = user_key(username);
        self.db
            .view(BUCKET, |b| b.get_json(&key))?
            .ok_or(Error::NotFound)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.db.view(BUCKET, |b| {
            let mut users = Vec::new();
            for key in b.keys()? {
                if !key.starts_with(USER_PREFIX) {
                    continue;
                }
                if let Some(user) = b.get_json::<User>(&key)? {
                    users.push(user);
                }
            }
            Ok(users)
        })
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        if username.is_empty() {
            return Err(Error::UsernameEmpty);
        }

        let user = user_key(username);
        let password = password_key(username);
        self.db.update(BUCKET, |b| {
            b.delete(&user)?;
            b.delete(&password)?;
            Ok(())
        })
    }
}
