use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

fn default_true() -> bool {
    true
}

/// A registered account. The password hash lives in a separate record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub admin: bool,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            admin: true,
            ..Self::new(username)
        }
    }
}

/// A package identified by its import URL.
///
/// `owners` and `readers` hold usernames only; they are never checked against
/// the credential store, so stale names are harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_url: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub owners: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub readers: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub private: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

impl Import {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: String::new(),
            description: String::new(),
            project_url: String::new(),
            owners: BTreeSet::new(),
            readers: BTreeSet::new(),
            private: false,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_owner(mut self, username: impl Into<String>) -> Self {
        self.owners.insert(username.into());
        self
    }

    #[must_use]
    pub fn with_reader(mut self, username: impl Into<String>) -> Self {
        self.readers.insert(username.into());
        self
    }

    #[must_use]
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    #[must_use]
    pub fn is_owner(&self, username: &str) -> bool {
        self.owners.contains(username)
    }

    #[must_use]
    pub fn is_reader(&self, username: &str) -> bool {
        self.readers.contains(username)
    }
}

/// A named release of an import, backed by exactly one stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub import_url: String,
    pub name: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub archive_type: String,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

impl Version {
    /// Creates a version with a freshly generated artifact id.
    #[must_use]
    pub fn new(
        import_url: impl Into<String>,
        name: impl Into<String>,
        archive_type: impl Into<String>,
    ) -> Self {
        Self {
            import_url: import_url.into(),
            name: name.into(),
            artifact_id: Uuid::new_v4().to_string(),
            archive_type: archive_type.into(),
            enabled: true,
        }
    }
}
