use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use grocer_core::ArtifactPayload;

use crate::error::StoreError;
use crate::index::{ArtifactEntry, ArtifactIndex};
use crate::naming::classify;
use crate::repository::ArtifactRepository;

/// Artifact store backed by a single flat directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the store directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))
    }

    async fn entry_for(
        &self,
        path: PathBuf,
        name: String,
    ) -> Result<Option<ArtifactEntry>, StoreError> {
        let Some(kind) = classify(&name) else {
            return Ok(None);
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(ArtifactEntry {
            name,
            path,
            kind,
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }))
    }
}

#[async_trait]
impl ArtifactRepository for FsArtifactStore {
    fn store_root(&self) -> &Path {
        &self.root
    }

    async fn index(&self) -> Result<ArtifactIndex, StoreError> {
        let mut index = ArtifactIndex::new();

        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(root = %self.root.display(), "artifact store does not exist yet");
                return Ok(index);
            }
            Err(e) => return Err(io_error(&self.root, e)),
        };

        while let Some(dirent) = dir
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            let Ok(name) = dirent.file_name().into_string() else {
                tracing::warn!(path = %dirent.path().display(), "skipping artifact with non-UTF-8 name");
                continue;
            };
            // A file vanishing between listing and stat is not worth failing the index over.
            match self.entry_for(dirent.path(), name).await {
                Ok(Some(entry)) => {
                    index.insert(entry);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable artifact"),
            }
        }

        Ok(index)
    }

    async fn read(&self, entry: &ArtifactEntry) -> Result<ArtifactPayload, StoreError> {
        let bytes = tokio::fs::read(&entry.path)
            .await
            .map_err(|e| io_error(&entry.path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Deserialize {
            path: entry.path.display().to_string(),
            source,
        })
    }

    async fn entry(&self, name: &str) -> Result<Option<ArtifactEntry>, StoreError> {
        self.entry_for(self.root.join(name), name.to_string()).await
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
