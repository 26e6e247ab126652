//! Trait abstraction for reading selected files to enable mocking in tests

use super::file::RawFile;
use async_trait::async_trait;

/// Source of file bytes for the ingestion pipeline
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read the full contents of a selected file
    async fn read(&self, file: &RawFile) -> std::io::Result<Vec<u8>>;
}
