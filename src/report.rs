//! Report channel for submission and ingestion outcomes

use crate::error::IngestionError;
use crate::form::{Field, FormValues};
use crate::ingest::ImageValue;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::json;
use uuid::Uuid;

/// A registration that made it through a submission cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRegistration {
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    /// Submitted values; the image, if any, is in parsed form.
    /// Serialized with the password masked.
    #[serde(serialize_with = "serialize_redacted")]
    pub values: FormValues,
}

/// Stands in for the password wherever a registration is serialized
pub const REDACTED_PASSWORD: &str = "********";

fn serialize_redacted<S: Serializer>(values: &FormValues, serializer: S) -> Result<S::Ok, S::Error> {
    let mut redacted = values.clone();
    if !redacted.password.is_empty() {
        redacted.password = REDACTED_PASSWORD.to_string();
    }
    redacted.serialize(serializer)
}

impl SubmittedRegistration {
    pub fn new(values: FormValues) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            values,
        }
    }

    /// Operator-facing summary without the password or image payload
    pub fn summary(&self) -> serde_json::Value {
        let values = &self.values;
        let image = values.image.as_ref().map(|image| match image {
            ImageValue::Parsed(parsed) => json!({
                "name": parsed.name,
                "mimeType": parsed.mime_type,
                "size": parsed.size,
            }),
            ImageValue::Raw(file) => json!({
                "name": file.name,
                "mimeType": file.mime_type,
                "parsed": false,
            }),
        });
        json!({
            "submissionId": self.submission_id,
            "submittedAt": self.submitted_at,
            "firstName": values.first_name,
            "lastName": values.last_name,
            "email": values.email,
            "gender": values.gender,
            "dateBirth": values.date_birth,
            "image": image,
        })
    }
}

/// Observer for outcomes that must not be silently dropped
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink: Send + Sync {
    /// A submission cycle finished with every value resolved
    fn on_submit_success(&self, registration: &SubmittedRegistration);

    /// The image could not be resolved at submit time; the form resets anyway
    fn on_submit_failure(&self, error: &IngestionError);

    /// Ingestion of the current selection for `field` failed
    fn on_ingestion_error(&self, field: Field, error: &IngestionError);
}

/// Sends reports to the tracing subscriber
#[derive(Debug, Clone, Default)]
pub struct TracingReporter;

impl ReportSink for TracingReporter {
    fn on_submit_success(&self, registration: &SubmittedRegistration) {
        tracing::info!(
            submission_id = %registration.submission_id,
            "Registration submitted: {}",
            registration.summary()
        );
    }

    fn on_submit_failure(&self, error: &IngestionError) {
        tracing::error!("Registration submitted without a readable image: {error}");
    }

    fn on_ingestion_error(&self, field: Field, error: &IngestionError) {
        tracing::warn!(%field, "Error parsing file: {error}");
    }
}
