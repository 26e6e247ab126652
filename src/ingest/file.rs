//! File handle and parsed image value objects

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// MIME type declared when nothing better is known
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A selected file before its bytes have been read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub path: PathBuf,
    pub name: String,
    /// MIME type declared by whoever selected the file
    pub mime_type: String,
    /// Size in bytes as declared at selection time
    pub size: u64,
}

impl RawFile {
    pub fn new(path: impl Into<PathBuf>, mime_type: &str, size: u64) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self {
            path,
            name,
            mime_type: mime_type.to_string(),
            size,
        }
    }

    /// Build a handle for a file on disk, declaring its type from the extension.
    ///
    /// Never fails: a missing or unreadable file still yields a handle (size 0)
    /// so the read error surfaces through ingestion.
    pub async fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let size = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::debug!("No metadata for {}: {e}", path.display());
                0
            }
        };
        let mime_type = guess_mime_type(&path);
        Self::new(path, &mime_type, size)
    }
}

/// A file whose bytes have been read and content-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedImage {
    pub name: String,
    pub mime_type: String,
    /// Number of bytes actually read
    pub size: u64,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

/// Value held by an image field: the raw handle until parsing lands, then the parsed form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageValue {
    Raw(RawFile),
    Parsed(ParsedImage),
}

impl ImageValue {
    /// Declared MIME type, whichever representation is held
    pub fn mime_type(&self) -> &str {
        match self {
            ImageValue::Raw(file) => &file.mime_type,
            ImageValue::Parsed(image) => &image.mime_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ImageValue::Raw(file) => &file.name,
            ImageValue::Parsed(image) => &image.name,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ImageValue::Parsed(_))
    }
}

/// Declared MIME type for a path, based on its extension
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
