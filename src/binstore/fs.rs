use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::BinStore;
use crate::error::{Error, Result};

const MAX_ARTIFACT_ID_LEN: usize = 128;

/// Stores each artifact as a file under `<root>/objects/<id[0..2]>/<id>`.
pub struct FsBinStore {
    base_path: PathBuf,
}

impl FsBinStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let base_path = root.as_ref().to_path_buf();
        fs::create_dir_all(base_path.join("objects"))?;
        fs::create_dir_all(base_path.join("tmp"))?;
        Ok(Self { base_path })
    }

    fn object_path(&self, artifact_id: &str) -> PathBuf {
        let prefix = &artifact_id[..artifact_id.len().min(2)];
        self.base_path
            .join("objects")
            .join(prefix)
            .join(artifact_id)
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join("tmp")
            .join(Uuid::new_v4().to_string())
    }
}

impl BinStore for FsBinStore {
    fn add(&self, artifact_id: &str, content: &[u8]) -> Result<()> {
        validate_artifact_id(artifact_id)?;

        let final_path = self.object_path(artifact_id);
        if final_path.exists() {
            return Err(Error::AlreadyExists);
        }

        let temp_path = self.temp_path();
        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // hard_link refuses to replace an existing file, so a concurrent
        // writer of the same id loses with AlreadyExists.
        let linked = fs::hard_link(&temp_path, &final_path);
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::warn!("Failed to remove temp file {}: {e}", temp_path.display());
        }

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::AlreadyExists),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn get(&self, artifact_id: &str) -> Result<Vec<u8>> {
        validate_artifact_id(artifact_id)?;

        fs::read(self.object_path(artifact_id)).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::NotFound
            } else {
                Error::Io(e)
            }
        })
    }

    fn delete(&self, artifact_id: &str) -> Result<()> {
        validate_artifact_id(artifact_id)?;

        match fs::remove_file(self.object_path(artifact_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Artifact ids become file names, so only a conservative alphabet is allowed.
fn validate_artifact_id(artifact_id: &str) -> Result<()> {
    if artifact_id.is_empty() || artifact_id.len() > MAX_ARTIFACT_ID_LEN {
        return Err(Error::InvalidArtifactId(artifact_id.to_string()));
    }

    if !artifact_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidArtifactId(artifact_id.to_string()));
    }

    Ok(())
}
