//! File-backed storage for the exported data document.
//!
//! Writes go to a temporary file in the target directory and are renamed
//! over the previous document, so a reader sees either the old or the new
//! content, never a missing or half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;

pub const DATA_JSON_FILE: &str = "data.json";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(DATA_JSON_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the stored document with `contents`.
    pub async fn save(&self, contents: Vec<u8>) -> Result<(), DomainError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &contents))
            .await
            .map_err(|e| DomainError::Internal(format!("snapshot writer panicked: {}", e)))?
    }

    /// Current document, `None` if no snapshot was ever written.
    pub async fn load(&self) -> Result<Option<Vec<u8>>, DomainError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), DomainError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| DomainError::Internal(e.to_string()))?;

    tracing::info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
