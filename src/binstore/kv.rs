use super::BinStore;
use crate::error::{Error, Result};
use crate::store::SqliteKv;

const BUCKET: &str = "dep-reg-binstore";

pub struct KvBinStore {
    db: SqliteKv,
}

impl KvBinStore {
    #[must_use]
    pub fn new(db: SqliteKv) -> Self {
        Self { db }
    }
}

impl BinStore for KvBinStore {
    fn add(&self, artifact_id: &str, content: &[u8]) -> Result<()> {
        self.db.update(BUCKET, |b| {
            if b.contains(artifact_id)? {
                return Err(Error::AlreadyExists);
            }
            b.put(artifact_id, content)
        })
    }

    fn get(&self, artifact_id: &str) -> Result<Vec<u8>> {
        self.db
            .view(BUCKET, |b| b.get(artifact_id))?
            .ok_or(Error::NotFound)
    }

    fn delete(&self, artifact_id: &str) -> Result<()> {
        self.db.update(BUCKET, |b| b.delete(artifact_id).map(|_| ()))
    }
}
