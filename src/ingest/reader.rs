//! Filesystem-backed file reader

use super::file::RawFile;
use super::traits::FileReader;
use async_trait::async_trait;

/// Reads selected files from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsFileReader;

#[async_trait]
impl FileReader for FsFileReader {
    async fn read(&self, file: &RawFile) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&file.path).await
    }
}
