//! In-memory index over the artifacts present in a store at one instant.
//!
//! Entries are keyed by artifact identity (the file name), so an artifact can
//! be inserted, and therefore counted, at most once no matter how many
//! filename patterns select it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::SystemTime;

use grocer_core::Site;

use crate::naming::ArtifactKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub modified: SystemTime,
}

impl ArtifactEntry {
    #[must_use]
    pub fn is_batch(&self) -> bool {
        matches!(self.kind, ArtifactKind::Batch { .. })
    }

    fn stem_lowercase(&self) -> Option<String> {
        match &self.kind {
            ArtifactKind::PerFile { stem } => Some(stem.to_lowercase()),
            ArtifactKind::Batch { .. } => None,
        }
    }

    fn batch_token(&self) -> Option<&str> {
        match &self.kind {
            ArtifactKind::Batch { token } => Some(token),
            ArtifactKind::PerFile { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    entries: BTreeMap<String, ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`; returns `false` if an artifact with the same identity is
    /// already indexed, leaving the existing entry in place.
    pub fn insert(&mut self, entry: ArtifactEntry) -> bool {
        if self.entries.contains_key(&entry.name) {
            tracing::debug!(artifact = %entry.name, "artifact already indexed; ignoring duplicate");
            return false;
        }
        self.entries.insert(entry.name.clone(), entry);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArtifactEntry> {
        self.entries.get(name)
    }

    /// Per-file artifacts in name order.
    pub fn per_file(&self) -> impl Iterator<Item = &ArtifactEntry> {
        self.entries.values().filter(|e| !e.is_batch())
    }

    pub fn batches(&self) -> impl Iterator<Item = &ArtifactEntry> {
        self.entries.values().filter(|e| e.is_batch())
    }

    /// Newest batch artifact by modification time. Equal mtimes fall back to
    /// the embedded token, then the name, so the choice is deterministic.
    #[must_use]
    pub fn latest_batch(&self) -> Option<&ArtifactEntry> {
        self.batches().max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.batch_token().cmp(&b.batch_token()))
                .then_with(|| a.name.cmp(&b.name))
        })
    }

    /// Per-file artifacts whose name associates them with `site`.
    ///
    /// Both historical patterns are honoured: names starting with the site id
    /// (`dmart-mumbai-parsed.json`) and names containing it anywhere
    /// (`run3-dmart-parsed.json`). An artifact matching both is returned once.
    #[must_use]
    pub fn candidates_for_site(&self, site: Site) -> Vec<&ArtifactEntry> {
        let id = site.as_str();
        let prefixed = self
            .per_file()
            .filter(|e| e.stem_lowercase().is_some_and(|s| s.starts_with(id)));
        let containing = self
            .per_file()
            .filter(|e| e.stem_lowercase().is_some_and(|s| s.contains(id)));

        let mut seen = BTreeSet::new();
        prefixed
            .chain(containing)
            .filter(|e| seen.insert(e.name.as_str()))
            .collect()
    }
}
