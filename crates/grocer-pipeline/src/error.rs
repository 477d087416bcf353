use thiserror::Error;

use grocer_core::CoreError;
use grocer_store::StoreError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting on {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by [`crate::QueryService`] operations.
///
/// Each variant carries a stable machine code (see [`QueryError::code`]) that
/// the HTTP layer maps to a status.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    UnsupportedSite(#[from] CoreError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File must be an HTML file")]
    InvalidFileType,

    #[error("{0}")]
    ParseFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl QueryError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::UnsupportedSite(_) | QueryError::InvalidFileType => "validation_error",
            QueryError::FileNotFound(_) => "not_found",
            QueryError::ParseFailed(_) => "parse_failed",
            QueryError::Internal(_) => "internal_error",
        }
    }
}

impl From<PipelineError> for QueryError {
    fn from(error: PipelineError) -> Self {
        tracing::error!(error = %error, "pipeline failure");
        QueryError::Internal(error.to_string())
    }
}
