//! Storage for archive binaries, keyed by artifact id.

mod fs;
mod kv;

use std::sync::Arc;

pub use fs::FsBinStore;
pub use kv::KvBinStore;

use crate::error::Result;
use crate::resolver::Resolver;
use crate::store::SqliteKv;

/// BinStore holds immutable artifacts.
pub trait BinStore: Send + Sync {
    /// Stores `content` under `artifact_id`. Fails with `AlreadyExists` if the
    /// id is taken; artifacts are never overwritten.
    fn add(&self, artifact_id: &str, content: &[u8]) -> Result<()>;

    fn get(&self, artifact_id: &str) -> Result<Vec<u8>>;

    /// Removes an artifact. Deleting an absent id is not an error.
    fn delete(&self, artifact_id: &str) -> Result<()>;
}

/// Resolver for `sqlite://`, `memory://` and `file://` binary stores.
#[must_use]
pub fn resolver() -> Resolver<Arc<dyn BinStore>> {
    Resolver::new("binstore")
        .register("sqlite", |addr| {
            Ok(Arc::new(KvBinStore::new(SqliteKv::open(addr)?)) as Arc<dyn BinStore>)
        })
        .register("memory", |_| {
            Ok(Arc::new(KvBinStore::new(SqliteKv::open_in_memory()?)) as Arc<dyn BinStore>)
        })
        .register("file", |addr| {
            Ok(Arc::new(FsBinStore::new(addr)?) as Arc<dyn BinStore>)
        })
}
