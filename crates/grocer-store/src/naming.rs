//! Artifact filename conventions shared with the external parser.
//!
//! | Artifact  | Name                                  |
//! |-----------|---------------------------------------|
//! | per-file  | `<stem-of-source-file>-parsed.json`   |
//! | batch     | `parsed-results-<sortable-token>.json` |
//!
//! A name matching both conventions is treated as a batch.

use std::path::Path;

pub const PARSED_SUFFIX: &str = "-parsed.json";
pub const BATCH_PREFIX: &str = "parsed-results-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Output for one source HTML page.
    PerFile { stem: String },
    /// Combined output of one directory parse. `token` is usually a timestamp.
    Batch { token: String },
}

/// Classifies a file name, returning `None` for anything that is not an artifact.
#[must_use]
pub fn classify(file_name: &str) -> Option<ArtifactKind> {
    if let Some(token) = file_name
        .strip_prefix(BATCH_PREFIX)
        .and_then(|rest| rest.strip_suffix(".json"))
        .filter(|token| !token.is_empty())
    {
        return Some(ArtifactKind::Batch {
            token: token.to_string(),
        });
    }

    file_name
        .strip_suffix(PARSED_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(|stem| ArtifactKind::PerFile {
            stem: stem.to_string(),
        })
}

/// Name of the per-file artifact the parser writes for `source`.
///
/// `dmart-mumbai.html` → `dmart-mumbai-parsed.json`.
#[must_use]
pub fn parsed_artifact_name(source: &Path) -> Option<String> {
    let stem = source.file_stem()?.to_str()?;
    Some(format!("{stem}{PARSED_SUFFIX}"))
}
