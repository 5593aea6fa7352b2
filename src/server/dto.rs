use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Import;

pub const DEFAULT_ARCHIVE_TYPE: &str = "zip";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Query for delete routes. Without `remove=true` a delete only disables.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishParams {
    #[serde(default)]
    pub archive_type: Option<String>,
    /// Only applies when the publish creates the import.
    #[serde(default)]
    pub private: bool,
}

impl PublishParams {
    pub fn archive_type(&self) -> &str {
        self.archive_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_ARCHIVE_TYPE)
    }
}

/// Body of `PUT /projects/{import}`. Replaces the editable fields; the URL
/// comes from the path and the enabled flag is left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateImportRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_url: String,
    #[serde(default)]
    pub owners: BTreeSet<String>,
    #[serde(default)]
    pub readers: BTreeSet<String>,
    #[serde(default)]
    pub private: bool,
}

impl UpdateImportRequest {
    pub fn into_import(self, current: &Import) -> Import {
        Import {
            url: current.url.clone(),
            name: self.name,
            description: self.description,
            project_url: self.project_url,
            owners: self.owners,
            readers: self.readers,
            private: self.private,
            enabled: current.enabled,
        }
    }
}
