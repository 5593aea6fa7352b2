use super::MetaStore;
use crate::error::{Error, Result};
use crate::store::{Bucket, SqliteKv};
use crate::types::{Import, Version};

const BUCKET: &str = "dep-reg-metastore";
const IMPORT_PREFIX: &str = "import/";
const VERSIONS_PREFIX: &str = "versions/";

fn import_key(url: &str) -> String {
    format!("{IMPORT_PREFIX}{url}")
}

fn versions_key(url: &str) -> String {
    format!("{VERSIONS_PREFIX}{url}")
}

/// Imports are stored under `import/<url>`, version lists under
/// `versions/<url>`. The prefixes keep any two URLs from sharing a key.
pub struct KvMetaStore {
    db: SqliteKv,
}

impl KvMetaStore {
    #[must_use]
    pub fn new(db: SqliteKv) -> Self {
        Self { db }
    }

    fn set_import_enabled(&self, url: &str, enabled: bool) -> Result<()> {
        let key = import_key(url);
        self.db.update(BUCKET, |b| {
            let mut import: Import = b.get_json(&key)?.ok_or(Error::NotFound)?;
            import.enabled = enabled;
            b.put_json(&key, &import)
        })
    }

    fn set_version_enabled(&self, url: &str, name: &str, enabled: bool) -> Result<()> {
        let key = versions_key(url);
        self.db.update(BUCKET, |b| {
            let mut versions = load_versions(b, &key)?.ok_or(Error::VersionNotFound)?;
            let version = versions
                .iter_mut()
                .find(|v| v.name == name)
                .ok_or(Error::VersionNotFound)?;
            version.enabled = enabled;
            b.put_json(&key, &versions)
        })
    }
}

fn load_versions(b: &Bucket<'_>, key: &str) -> Result<Option<Vec<Version>>> {
    b.get_json(key)
}

impl MetaStore for KvMetaStore {
    fn add_import_if_not_exists(&self, import: &Import) -> Result<()> {
        let key = import_key(&import.url);
        self.db.update(BUCKET, |b| {
            if b.contains(&key)? {
                return Ok(());
            }
            b.put_json(&key, import)
        })
    }

    fn update_import(&self, import: &Import) -> Result<()> {
        let key = import_key(&import.url);
        self.db.update(BUCKET, |b| b.put_json(&key, import))
    }

    fn add_version(&self, version: &Version) -> Result<()> {
        let key = versions_key(&version.import_url);
        self.db.update(BUCKET, |b| {
            let mut versions = load_versions(b, &key)?.unwrap_or_default();
            if versions.iter().any(|v| v.name == version.name) {
                return Err(Error::AlreadyExists);
            }
            versions.push(version.clone());
            b.put_json(&key, &versions)
        })
    }

    fn get_import(&self, url: &str) -> Result<Import> {
        let key = import_key(url);
        self.db
            .view(BUCKET, |b| b.get_json(&key))?
            .ok_or(Error::NotFound)
    }

    fn get_versions(&self, url: &str) -> Result<Vec<Version>> {
        let key = versions_key(url);
        self.db
            .view(BUCKET, |b| load_versions(b, &key))?
            .ok_or(Error::NotFound)
    }

    fn enable_import(&self, url: &str) -> Result<()> {
        self.set_import_enabled(url, true)
    }

    fn disable_import(&self, url: &str) -> Result<()> {
        self.set_import_enabled(url, false)
    }

    fn enable_version(&self, url: &str, name: &str) -> Result<()> {
        self.set_version_enabled(url, name, true)
    }

    fn disable_version(&self, url: &str, name: &str) -> Result<()> {
        self.set_version_enabled(url, name, false)
    }

    fn delete_import(&self, url: &str) -> Result<()> {
        let import = import_key(url);
        let versions = versions_key(url);
        self.db.update(BUCKET, |b| {
            b.delete(&import)?;
            b.delete(&versions)?;
            Ok(())
        })
    }

    fn delete_version(&self, url: &str, name: &str) -> Result<()> {
        let key = versions_key(url);
        self.db.update(BUCKET, |b| {
            let Some(mut versions) = load_versions(b, &key)? else {
                return Ok(());
            };
            versions.retain(|v| v.name != name);
            b.put_json(&key, &versions)
        })
    }
}
