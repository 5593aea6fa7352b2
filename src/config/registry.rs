use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_PREFIX: &str = "DEPREG_";

pub const DEFAULT_AUTH_PATH: &str = "userpass://auth.db";
pub const DEFAULT_BINSTORE_PATH: &str = "sqlite://binstore.db";
pub const DEFAULT_METASTORE_PATH: &str = "sqlite://metastore.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
pub const MIN_TOKEN_TTL_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

const GENERATED_KEY_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Connection string for the credential backend.
    pub auth_path: String,
    pub binstore_path: String,
    pub metastore_path: String,
    /// HMAC key for identity tokens. Generated per process when empty, which
    /// invalidates every token on restart.
    pub signing_key: String,
    pub token_ttl_secs: u64,
    pub host: String,
    pub port: u16,
    /// Largest archive accepted by the publish route.
    pub max_upload_bytes: usize,
    /// Set by `validate` when `signing_key` was generated for this process.
    #[serde(skip)]
    pub signing_key_generated: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            binstore_path: DEFAULT_BINSTORE_PATH.to_string(),
            metastore_path: DEFAULT_METASTORE_PATH.to_string(),
            signing_key: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            signing_key_generated: false,
        }
    }
}

impl RegistryConfig {
    /// Reads a config file (when given), overlays `DEPREG_*` environment
    /// variables, and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|name| std::env::var(name).ok())?.validate()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Overlays values from `lookup`, which maps a variable name such as
    /// `DEPREG_PORT` to its value.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

        if let Some(v) = var("AUTH_PATH") {
            self.auth_path = v;
        }
        if let Some(v) = var("BINSTORE_PATH") {
            self.binstore_path = v;
        }
        if let Some(v) = var("METASTORE_PATH") {
            self.metastore_path = v;
        }
        if let Some(v) = var("SIGNING_KEY") {
            self.signing_key = v;
        }
        if let Some(v) = var("TOKEN_TTL") {
            self.token_ttl_secs = v
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_PREFIX}TOKEN_TTL must be seconds, got '{v}'")))?;
        }
        if let Some(v) = var("HOST") {
            self.host = v;
        }
        if let Some(v) = var("PORT") {
            self.port = v
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_PREFIX}PORT must be a port number, got '{v}'")))?;
        }
        if let Some(v) = var("MAX_UPLOAD") {
            self.max_upload_bytes = v
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_PREFIX}MAX_UPLOAD must be bytes, got '{v}'")))?;
        }

        Ok(self)
    }

    /// Fills in defaults for anything left empty.
    pub fn validate(mut self) -> Result<Self> {
        if self.auth_path.is_empty() {
            self.auth_path = DEFAULT_AUTH_PATH.to_string();
        }
        if self.binstore_path.is_empty() {
            self.binstore_path = DEFAULT_BINSTORE_PATH.to_string();
        }
        if self.metastore_path.is_empty() {
            self.metastore_path = DEFAULT_METASTORE_PATH.to_string();
        }
        if self.signing_key.is_empty() {
            tracing::warn!("No signing key specified, generating a temporary key");
            self.signing_key = generate_signing_key();
            self.signing_key_generated = true;
        }
        if self.token_ttl_secs < MIN_TOKEN_TTL_SECS {
            tracing::warn!(
                "Token TTL of {}s is below the {}s minimum, using {}s",
                self.token_ttl_secs,
                MIN_TOKEN_TTL_SECS,
                DEFAULT_TOKEN_TTL_SECS
            );
            self.token_ttl_secs = DEFAULT_TOKEN_TTL_SECS;
        }
        if self.host.is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.max_upload_bytes == 0 {
            self.max_upload_bytes = DEFAULT_MAX_UPLOAD_BYTES;
        }
        if self.port == 0 {
            return Err(Error::Config("port cannot be 0".to_string()));
        }

        Ok(self)
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn generate_signing_key() -> String {
    let mut bytes = [0u8; GENERATED_KEY_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default().validate().unwrap();
        assert_eq!(config.auth_path, DEFAULT_AUTH_PATH);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.signing_key.len(), GENERATED_KEY_BYTES * 2);
        assert_eq!(config.socket_addr().unwrap().port(), DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.signing_key_generated);
    }

    #[test]
    fn test_configured_key_not_marked_generated() {
        let config = RegistryConfig::from_toml("signing_key = \"abc\"")
            .unwrap()
            .validate()
            .unwrap();
        assert!(!config.signing_key_generated);
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = RegistryConfig::default().validate().unwrap();
        let b = RegistryConfig::default().validate().unwrap();
        assert_ne!(a.signing_key, b.signing_key);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RegistryConfig::from_toml(
            r#"
            metastore_path = "memory://"
            signing_key = "abc"
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.metastore_path, "memory://");
        assert_eq!(config.signing_key, "abc");
        assert_eq!(config.port, 9000);
        assert_eq!(config.binstore_path, DEFAULT_BINSTORE_PATH);
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(matches!(
            RegistryConfig::from_toml("port = \"not a number\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = RegistryConfig::from_toml("signing_key = \"from-file\"")
            .unwrap()
            .with_env(env(&[
                ("DEPREG_SIGNING_KEY", "from-env"),
                ("DEPREG_TOKEN_TTL", "120"),
                ("DEPREG_PORT", "9090"),
                ("DEPREG_AUTH_PATH", ""),
                ("DEPREG_MAX_UPLOAD", "1048576"),
            ]))
            .unwrap();

        assert_eq!(config.signing_key, "from-env");
        assert_eq!(config.token_ttl(), Duration::from_secs(120));
        assert_eq!(config.port, 9090);
        assert_eq!(config.auth_path, DEFAULT_AUTH_PATH);
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
    }

    #[test]
    fn test_zero_upload_limit_reset() {
        let config = RegistryConfig::from_toml("max_upload_bytes = 0\nsigning_key = \"k\"")
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_env_invalid_number() {
        let result = RegistryConfig::default().with_env(env(&[("DEPREG_TOKEN_TTL", "1h")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_short_ttl_reset() {
        let config = RegistryConfig {
            token_ttl_secs: 5,
            signing_key: "key".to_string(),
            ..RegistryConfig::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_empty_paths_filled() {
        let config = RegistryConfig {
            binstore_path: String::new(),
            host: String::new(),
            ..RegistryConfig::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.binstore_path, DEFAULT_BINSTORE_PATH);
        assert_eq!(config.host, DEFAULT_HOST);
    }
}
