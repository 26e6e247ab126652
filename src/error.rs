//! Error types for image ingestion

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure while turning a selected file into its parsed representation
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The underlying read failed (missing file, permissions, I/O)
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The read did not finish within the configured timeout
    #[error("reading {} timed out after {}s", path.display(), after.as_secs())]
    TimedOut { path: PathBuf, after: Duration },
}

#[allow(dead_code)]
impl IngestionError {
    /// Path of the file the failure belongs to
    pub fn path(&self) -> &std::path::Path {
        match self {
            IngestionError::Read { path, .. } | IngestionError::TimedOut { path, .. } => path,
        }
    }
}

pub type IngestionResult<T> = std::result::Result<T, IngestionError>;
