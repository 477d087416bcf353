use std::path::Path;

use async_trait::async_trait;
use grocer_core::ArtifactPayload;

use crate::error::StoreError;
use crate::index::{ArtifactEntry, ArtifactIndex};

/// Read access to a store of parse artifacts.
///
/// [`crate::FsArtifactStore`] is the only implementation today; the trait is
/// the seam for an object-store or embedded-database backend.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Location new artifacts are expected to appear in.
    fn store_root(&self) -> &Path;

    /// Snapshot of every artifact currently in the store. A store that does
    /// not exist yet is empty, not an error.
    async fn index(&self) -> Result<ArtifactIndex, StoreError>;

    /// Reads and decodes one artifact.
    async fn read(&self, entry: &ArtifactEntry) -> Result<ArtifactPayload, StoreError>;

    /// Looks up a single artifact by name without indexing the whole store.
    async fn entry(&self, name: &str) -> Result<Option<ArtifactEntry>, StoreError>;
}
