//! Flat-file artifact store shared with the external scraper and parser.
//!
//! The parser writes one `<stem>-parsed.json` per source page and, for
//! directory runs, one `parsed-results-<token>.json` batch. Nothing here
//! writes or deletes artifacts; the store only indexes and reads them.

pub mod error;
pub mod fs;
pub mod index;
pub mod naming;
pub mod repository;

pub use error::StoreError;
pub use fs::FsArtifactStore;
pub use index::{ArtifactEntry, ArtifactIndex};
pub use naming::{classify, parsed_artifact_name, ArtifactKind, BATCH_PREFIX, PARSED_SUFFIX};
pub use repository::ArtifactRepository;
