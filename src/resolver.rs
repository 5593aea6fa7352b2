//! Connection-string dispatch for pluggable backends.
//!
//! A connection string has the form `<scheme>://<address>`. Each backend kind
//! (credentials, binaries, metadata) owns a [`Resolver`] whose factories are
//! registered up front; resolving looks the scheme up and hands the address to
//! the matching constructor.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

const SEPARATOR: &str = "://";

/// Constructor for a backend, given the address part of a connection string.
pub type Factory<T> = Box<dyn Fn(&str) -> Result<T> + Send + Sync>;

/// Splits a connection string into `(scheme, address)`.
pub fn parse_connection_string(conn: &str) -> Result<(&str, &str)> {
    conn.split_once(SEPARATOR)
        .ok_or_else(|| Error::InvalidConnectionString(conn.to_string()))
}

pub struct Resolver<T> {
    kind: &'static str,
    factories: BTreeMap<String, Factory<T>>,
}

impl<T> Resolver<T> {
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: BTreeMap::new(),
        }
    }

    /// Registers a factory for `scheme`, replacing any earlier one.
    #[must_use]
    pub fn register<F>(mut self, scheme: &str, factory: F) -> Self
    where
        F: Fn(&str) -> Result<T> + Send + Sync + 'static,
    {
        self.factories.insert(scheme.to_string(), Box::new(factory));
        self
    }

    pub fn resolve(&self, conn: &str) -> Result<T> {
        let (scheme, address) = parse_connection_string(conn)?;
        let factory = self
            .factories
            .get(scheme)
            .ok_or_else(|| Error::UnknownBackend(scheme.to_string()))?;

        tracing::debug!("Opening {} backend '{}' at '{}'", self.kind, scheme, address);
        factory(address)
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("kind", &self.kind)
            .field("schemes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
