//! Turns selected files into data-URI encoded images
//!
//! The pipeline only transforms bytes. Whether a file type is acceptable is
//! decided by the form schema, not here.

use super::file::{ImageValue, ParsedImage, RawFile, FALLBACK_MIME_TYPE};
use super::reader::FsFileReader;
use super::traits::FileReader;
use crate::error::{IngestionError, IngestionResult};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;
use std::time::Duration;

/// Asynchronous file-to-image transformer.
///
/// Clones share the same reader, so each selection can be parsed on its own task.
/// Invocations are independent: a newer selection never cancels an older read.
#[derive(Clone)]
pub struct IngestionPipeline {
    reader: Arc<dyn FileReader>,
    timeout: Option<Duration>,
}

impl IngestionPipeline {
    pub fn new(reader: Arc<dyn FileReader>) -> Self {
        Self {
            reader,
            timeout: None,
        }
    }

    /// Pipeline reading from the local filesystem
    pub fn filesystem() -> Self {
        Self::new(Arc::new(FsFileReader))
    }

    /// Fail reads that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Read `file` and encode it as a data URI
    pub async fn parse(&self, file: &RawFile) -> IngestionResult<ParsedImage> {
        let bytes = self.read(file).await?;

        if file.size != 0 && file.size != bytes.len() as u64 {
            tracing::debug!(
                "{} declared {} bytes but {} were read",
                file.name,
                file.size,
                bytes.len()
            );
        }

        let mime_type = if file.mime_type.is_empty() {
            FALLBACK_MIME_TYPE
        } else {
            file.mime_type.as_str()
        };

        Ok(ParsedImage {
            name: file.name.clone(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            data_url: encode_data_url(mime_type, &bytes),
        })
    }

    /// Parsed form of an image value; already parsed values are returned as-is
    pub async fn resolve(&self, image: &ImageValue) -> IngestionResult<ParsedImage> {
        match image {
            ImageValue::Parsed(parsed) => Ok(parsed.clone()),
            ImageValue::Raw(file) => self.parse(file).await,
        }
    }

    async fn read(&self, file: &RawFile) -> IngestionResult<Vec<u8>> {
        let read = self.reader.read(file);
        let result = match self.timeout {
            Some(after) => tokio::time::timeout(after, read)
                .await
                .map_err(|_| IngestionError::TimedOut {
                    path: file.path.clone(),
                    after,
                })?,
            None => read.await,
        };
        result.map_err(|source| IngestionError::Read {
            path: file.path.clone(),
            source,
        })
    }
}

/// `data:<mime>;base64,<payload>`
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::traits::MockFileReader;
    use pretty_assertions::assert_eq;
    use std::io;

    fn png() -> RawFile {
        RawFile::new("/photos/ada.png", "image/png", 3)
    }

    fn pipeline_returning(bytes: Vec<u8>) -> IngestionPipeline {
        let mut reader = MockFileReader::new();
        reader
            .expect_read()
            .returning(move |_| Ok(bytes.clone()));
        IngestionPipeline::new(Arc::new(reader))
    }

    mod parse {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_encodes_bytes_as_data_url() {
            let pipeline = pipeline_returning(b"abc".to_vec());
            let parsed = pipeline.parse(&png()).await.unwrap();

            assert_eq!(parsed.data_url, "data:image/png;base64,YWJj");
            assert_eq!(parsed.mime_type, "image/png");
            assert_eq!(parsed.size, 3);
            assert_eq!(parsed.name, "ada.png");
        }

        #[tokio::test]
        async fn test_size_is_bytes_read() {
            let pipeline = pipeline_returning(vec![0; 10]);
            let parsed = pipeline.parse(&png()).await.unwrap();
            assert_eq!(parsed.size, 10);
        }

        #[tokio::test]
        async fn test_missing_mime_type_falls_back() {
            let pipeline = pipeline_returning(vec![1]);
            let file = RawFile::new("blob", "", 1);
            let parsed = pipeline.parse(&file).await.unwrap();
            assert_eq!(parsed.mime_type, FALLBACK_MIME_TYPE);
            assert!(parsed.data_url.starts_with("data:application/octet-stream;base64,"));
        }

        #[tokio::test]
        async fn test_does_not_judge_file_type() {
            let pipeline = pipeline_returning(b"GIF89a".to_vec());
            let file = RawFile::new("anim.gif", "image/gif", 6);
            let parsed = pipeline.parse(&file).await.unwrap();
            assert_eq!(parsed.mime_type, "image/gif");
        }

        #[tokio::test]
        async fn test_read_failure_is_surfaced() {
            let mut reader = MockFileReader::new();
            reader.expect_read().returning(|_| {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            });
            let pipeline = IngestionPipeline::new(Arc::new(reader));

            let err = pipeline.parse(&png()).await.unwrap_err();
            match err {
                IngestionError::Read { path, source } => {
                    assert_eq!(path, std::path::PathBuf::from("/photos/ada.png"));
                    assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    mod resolve {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_parsed_value_is_returned_without_reading() {
            let mut reader = MockFileReader::new();
            reader.expect_read().never();
            let pipeline = IngestionPipeline::new(Arc::new(reader));

            let parsed = ParsedImage {
                name: "ada.png".to_string(),
                mime_type: "image/png".to_string(),
                size: 3,
                data_url: "data:image/png;base64,YWJj".to_string(),
            };
            let resolved = pipeline
                .resolve(&ImageValue::Parsed(parsed.clone()))
                .await
                .unwrap();
            assert_eq!(resolved, parsed);
        }

        #[tokio::test]
        async fn test_raw_value_is_parsed() {
            let pipeline = pipeline_returning(b"abc".to_vec());
            let resolved = pipeline.resolve(&ImageValue::Raw(png())).await.unwrap();
            assert_eq!(resolved.data_url, "data:image/png;base64,YWJj");
        }
    }

    mod timeout {
        use super::*;

        struct HangingReader;

        #[async_trait::async_trait]
        impl FileReader for HangingReader {
            async fn read(&self, _file: &RawFile) -> io::Result<Vec<u8>> {
                std::future::pending().await
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_hung_read_times_out_when_configured() {
            let pipeline = IngestionPipeline::new(Arc::new(HangingReader))
                .with_timeout(Some(Duration::from_secs(2)));

            let err = pipeline.parse(&png()).await.unwrap_err();
            assert!(matches!(
                err,
                IngestionError::TimedOut { after, .. } if after == Duration::from_secs(2)
            ));
        }

        #[test]
        fn test_hung_read_stays_pending_without_timeout() {
            let pipeline = IngestionPipeline::new(Arc::new(HangingReader));
            let file = png();
            let mut task = tokio_test::task::spawn(pipeline.parse(&file));
            tokio_test::assert_pending!(task.poll());
            tokio_test::assert_pending!(task.poll());
        }
    }

    #[test]
    fn test_encode_data_url_empty_payload() {
        assert_eq!(encode_data_url("image/jpeg", &[]), "data:image/jpeg;base64,");
    }
}
