//! Multi-step operations spanning the binary and metadata stores.
//!
//! Nothing here is atomic across the two stores. `add` writes metadata before
//! the binary, so a crash in between leaves a version whose archive reports
//! `NotFound` rather than an unreferenced blob. `delete_import` removes
//! metadata first and then cleans up binaries on a best-effort basis.

use std::sync::Arc;

use crate::binstore::BinStore;
use crate::error::{Error, Result};
use crate::metastore::MetaStore;
use crate::types::{Import, Version};

pub struct StoreManager {
    bin: Arc<dyn BinStore>,
    meta: Arc<dyn MetaStore>,
}

impl StoreManager {
    #[must_use]
    pub fn new(bin: Arc<dyn BinStore>, meta: Arc<dyn MetaStore>) -> Self {
        Self { bin, meta }
    }

    /// Records the import (if new) and the version, then stores the archive.
    pub fn add(&self, import: &Import, version: &Version, content: &[u8]) -> Result<()> {
        if version.import_url != import.url {
            return Err(Error::BadRequest(format!(
                "version belongs to '{}', not '{}'",
                version.import_url, import.url
            )));
        }

        self.meta.add_import_if_not_exists(import)?;
        self.meta.add_version(version)?;
        self.bin.add(&version.artifact_id, content)
    }

    pub fn update_import(&self, import: &Import) -> Result<()> {
        self.meta.update_import(import)
    }

    pub fn get(&self, url: &str) -> Result<Import> {
        self.meta.get_import(url)
    }

    pub fn get_versions(&self, url: &str) -> Result<Vec<Version>> {
        let import = self.meta.get_import(url)?;
        self.meta.get_versions(&import.url)
    }

    /// Looks a version up by name; an empty name means the most recently
    /// added version.
    pub fn get_version(&self, url: &str, name: &str) -> Result<Version> {
        let versions = self.get_versions(url)?;

        if name.is_empty() {
            return versions.into_iter().next_back().ok_or(Error::VersionNotFound);
        }

        versions
            .into_iter()
            .find(|v| v.name == name)
            .ok_or(Error::VersionNotFound)
    }

    pub fn get_version_binary(&self, version: &Version) -> Result<Vec<u8>> {
        self.bin.get(&version.artifact_id)
    }

    pub fn enable_import(&self, url: &str) -> Result<()> {
        self.meta.enable_import(url)
    }

    pub fn disable_import(&self, url: &str) -> Result<()> {
        self.meta.disable_import(url)
    }

    pub fn enable_version(&self, url: &str, name: &str) -> Result<()> {
        let version = self.get_version(url, name)?;
        self.meta.enable_version(url, &version.name)
    }

    pub fn disable_version(&self, url: &str, name: &str) -> Result<()> {
        let version = self.get_version(url, name)?;
        self.meta.disable_version(url, &version.name)
    }

    /// Deletes an import and all its versions. Binary cleanup failures are
    /// logged and otherwise ignored.
    pub fn delete_import(&self, url: &str) -> Result<()> {
        let versions = match self.get_versions(url) {
            Ok(versions) => versions,
            Err(Error::NotFound) => Vec::new(),
            Err(e) => return Err(e),
        };

        self.meta.delete_import(url)?;

        for version in &versions {
            if let Err(e) = self.bin.delete(&version.artifact_id) {
                tracing::warn!(
                    "Failed to delete archive {} for {}@{}: {e}",
                    version.artifact_id,
                    url,
                    version.name
                );
            }
        }

        Ok(())
    }

    /// Deletes one version's metadata and then its archive. Unlike
    /// `delete_import`, a failed archive delete is returned.
    pub fn delete_version(&self, url: &str, name: &str) -> Result<()> {
        let version = self.get_version(url, name)?;
        self.meta.delete_version(url, &version.name)?;
        self.bin.delete(&version.artifact_id)
    }
}
