//! Storage for import and version records.

mod kv;

use std::sync::Arc;

pub use kv::KvMetaStore;

use crate::error::Result;
use crate::resolver::Resolver;
use crate::store::SqliteKv;
use crate::types::{Import, Version};

/// MetaStore holds imports and their ordered version lists.
///
/// Deleting metadata never touches binaries; that is the store manager's job.
pub trait MetaStore: Send + Sync {
    /// Inserts the import unless one with the same URL already exists.
    fn add_import_if_not_exists(&self, import: &Import) -> Result<()>;

    fn update_import(&self, import: &Import) -> Result<()>;

    /// Appends a version to its import's list. Fails with `AlreadyExists` if
    /// the name is already taken under that import.
    fn add_version(&self, version: &Version) -> Result<()>;

    fn get_import(&self, url: &str) -> Result<Import>;

    /// Versions in insertion order. Fails with `NotFound` if no version list
    /// was ever recorded for the import.
    fn get_versions(&self, url: &str) -> Result<Vec<Version>>;

    fn enable_import(&self, url: &str) -> Result<()>;
    fn disable_import(&self, url: &str) -> Result<()>;
    fn enable_version(&self, url: &str, name: &str) -> Result<()>;
    fn disable_version(&self, url: &str, name: &str) -> Result<()>;

    /// Removes the import and its version list.
    fn delete_import(&self, url: &str) -> Result<()>;

    fn delete_version(&self, url: &str, name: &str) -> Result<()>;
}

/// Resolver for `sqlite://` and `memory://` metadata stores.
#[must_use]
pub fn resolver() -> Resolver<Arc<dyn MetaStore>> {
    Resolver::new("metastore")
        .register("sqlite", |addr| {
            Ok(Arc::new(KvMetaStore::new(SqliteKv::open(addr)?)) as Arc<dyn MetaStore>)
        })
        .register("memory", |_| {
            Ok(Arc::new(KvMetaStore::new(SqliteKv::open_in_memory()?)) as Arc<dyn MetaStore>)
        })
}
