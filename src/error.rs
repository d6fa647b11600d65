//! Error types for the exifdiff library.

use std::io;
use std::path::PathBuf;

/// Errors raised while fetching, aligning or rendering metadata.
#[derive(Debug, thiserror::Error)]
pub enum ExifDiffError {
    /// Bad or missing arguments.
    #[error("usage error: {0}")]
    Usage(String),

    /// The metadata tool could not be started.
    #[error("failed to start {program:?}: {source}")]
    ExifToolSpawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to the metadata tool failed.
    #[error("exiftool session I/O error: {0}")]
    ExifToolIo(#[from] io::Error),

    /// The metadata tool produced output that is not the expected JSON.
    #[error("malformed exiftool output: {0}")]
    ExifToolOutput(#[from] serde_json::Error),

    /// The metadata tool answered, but not with one record per file.
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(String),

    /// An edit script or rendering step broke one of its own invariants.
    #[error("internal consistency fault: {0}")]
    InternalConsistency(String),
}

impl ExifDiffError {
    /// Returns `true` for errors that abort a single diff block rather than
    /// the whole run.
    pub fn is_block_fault(&self) -> bool {
        matches!(self, ExifDiffError::InternalConsistency(_))
    }
}

/// Convenience alias for exifdiff results.
pub type DiffResult<T> = Result<T, ExifDiffError>;
