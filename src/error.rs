use serde::Serialize;
use std::path::PathBuf;

/// Structural failures while reading the source file. Any of these aborts the
/// pipeline; there is no partially loaded working set.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Per-request failures. They never touch the working set.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GlpError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl GlpError {
    pub fn category(&self) -> &'static str {
        match self {
            GlpError::Ingest(_) => "ingestError",
            GlpError::Query(_) => "queryError",
        }
    }
}

/// What the presentation boundary renders for a failed operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub category: String,
    pub message: String,
}

impl From<&GlpError> for ErrorBody {
    fn from(e: &GlpError) -> Self {
        Self {
            category: e.category().to_string(),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GlpError>;
