//! Final gate of a submission cycle

use crate::error::IngestionError;
use crate::form::FormValues;
use crate::ingest::{ImageValue, IngestionPipeline};
use crate::report::{ReportSink, SubmittedRegistration};
use std::sync::Arc;

/// How a submission cycle ended. The form resets in both cases.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Submitted(SubmittedRegistration),
    Failed(IngestionError),
}

#[allow(dead_code)]
impl SubmissionOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted(_))
    }
}

/// Resolves the image one last time and reports the result
#[derive(Clone)]
pub struct SubmissionHandler {
    pipeline: IngestionPipeline,
    reporter: Arc<dyn ReportSink>,
}

impl SubmissionHandler {
    pub fn new(pipeline: IngestionPipeline, reporter: Arc<dyn ReportSink>) -> Self {
        Self { pipeline, reporter }
    }

    /// Submit values that already passed validation
    pub async fn submit(&self, mut values: FormValues) -> SubmissionOutcome {
        if let Some(image) = &values.image {
            match self.pipeline.resolve(image).await {
                Ok(parsed) => values.image = Some(ImageValue::Parsed(parsed)),
                Err(err) => {
                    self.reporter.on_submit_failure(&err);
                    return SubmissionOutcome::Failed(err);
                }
            }
        }

        let registration = SubmittedRegistration::new(values);
        self.reporter.on_submit_success(&registration);
        SubmissionOutcome::Submitted(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Gender;
    use crate::ingest::{MockFileReader, ParsedImage, RawFile};
    use crate::report::MockReportSink;
    use pretty_assertions::assert_eq;
    use std::io;

    fn values_with(image: Option<ImageValue>) -> FormValues {
        FormValues {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@x.com".to_string(),
            password: "secret1".to_string(),
            gender: Gender::Female,
            image,
            date_birth: "1815-12-10".to_string(),
        }
    }

    fn handler(reader: MockFileReader, reporter: MockReportSink) -> SubmissionHandler {
        SubmissionHandler::new(
            IngestionPipeline::new(Arc::new(reader)),
            Arc::new(reporter),
        )
    }

    #[tokio::test]
    async fn test_without_image_reports_success() {
        let mut reader = MockFileReader::new();
        reader.expect_read().never();
        let mut reporter = MockReportSink::new();
        reporter
            .expect_on_submit_success()
            .withf(|r| r.values.first_name == "Ada" && r.values.image.is_none())
            .times(1)
            .return_const(());
        reporter.expect_on_submit_failure().never();

        let outcome = handler(reader, reporter).submit(values_with(None)).await;
        assert!(outcome.is_submitted());
    }

    #[tokio::test]
    async fn test_raw_image_is_parsed_before_reporting() {
        let mut reader = MockFileReader::new();
        reader
            .expect_read()
            .times(1)
            .returning(|_| Ok(b"abc".to_vec()));
        let mut reporter = MockReportSink::new();
        reporter
            .expect_on_submit_success()
            .withf(|r| {
                matches!(&r.values.image, Some(ImageValue::Parsed(p)) if p.data_url == "data:image/png;base64,YWJj")
            })
            .times(1)
            .return_const(());

        let raw = ImageValue::Raw(RawFile::new("ada.png", "image/png", 3));
        let outcome = handler(reader, reporter).submit(values_with(Some(raw))).await;

        match outcome {
            SubmissionOutcome::Submitted(registration) => {
                assert_eq!(registration.values.password, "secret1");
                assert!(registration.values.image.unwrap().is_parsed());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parsed_image_is_not_read_again() {
        let mut reader = MockFileReader::new();
        reader.expect_read().never();
        let mut reporter = MockReportSink::new();
        reporter.expect_on_submit_success().times(1).return_const(());

        let parsed = ParsedImage {
            name: "ada.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 3,
            data_url: "data:image/png;base64,YWJj".to_string(),
        };
        let values = values_with(Some(ImageValue::Parsed(parsed.clone())));
        let outcome = handler(reader, reporter).submit(values).await;

        match outcome {
            SubmissionOutcome::Submitted(registration) => {
                assert_eq!(registration.values.image, Some(ImageValue::Parsed(parsed)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_failure_is_reported_not_swallowed() {
        let mut reader = MockFileReader::new();
        reader
            .expect_read()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "gone")));
        let mut reporter = MockReportSink::new();
        reporter.expect_on_submit_success().never();
        reporter
            .expect_on_submit_failure()
            .withf(|e| matches!(e, IngestionError::Read { .. }))
            .times(1)
            .return_const(());

        let raw = ImageValue::Raw(RawFile::new("gone.png", "image/png", 3));
        let outcome = handler(reader, reporter).submit(values_with(Some(raw))).await;
        assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
    }
}
