//! One registration form session: state machine, ingestion and submission wired together

use crate::error::IngestionError;
use crate::form::{Field, FieldValue, FormState, IngestionApplied, IngestionTicket, SubmitGate};
use crate::ingest::{IngestionPipeline, ParsedImage, RawFile};
use crate::report::ReportSink;
use crate::submission::{SubmissionHandler, SubmissionOutcome};
use std::sync::Arc;

/// An ingestion that has finished, waiting to be applied to the form
#[derive(Debug)]
pub struct CompletedIngestion {
    pub ticket: IngestionTicket,
    pub result: Result<ParsedImage, IngestionError>,
}

/// Drives a [`FormState`] from user events.
///
/// All mutation goes through `&mut self`, one event at a time. Ingestion work can
/// run elsewhere (see [`FormSession::pipeline`]); only its completed result comes
/// back through [`FormSession::apply_ingestion`].
pub struct FormSession {
    state: FormState,
    pipeline: IngestionPipeline,
    handler: SubmissionHandler,
    reporter: Arc<dyn ReportSink>,
}

#[allow(dead_code)]
impl FormSession {
    pub fn new(pipeline: IngestionPipeline, reporter: Arc<dyn ReportSink>) -> Self {
        let handler = SubmissionHandler::new(pipeline.clone(), Arc::clone(&reporter));
        Self {
            state: FormState::new(),
            pipeline,
            handler,
            reporter,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Pipeline to run tickets on, for callers that ingest on their own tasks
    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    pub fn handle_change(&mut self, field: Field, raw: &str) {
        self.state.handle_change(field, raw);
    }

    pub fn handle_blur(&mut self, field: Field) {
        self.state.handle_blur(field);
    }

    pub fn set_field_value(&mut self, field: Field, value: FieldValue) {
        self.state.set_field_value(field, value);
    }

    /// Record a file selection; the returned ticket must be ingested and applied
    pub fn select_file(&mut self, field: Field, file: RawFile) -> Option<IngestionTicket> {
        tracing::debug!("Selected {} ({}) for {field}", file.name, file.mime_type);
        self.state.select_file(field, file)
    }

    /// Run the pipeline for a ticket without touching form state
    pub async fn ingest(&self, ticket: IngestionTicket) -> CompletedIngestion {
        let result = self.pipeline.parse(&ticket.file).await;
        CompletedIngestion { ticket, result }
    }

    /// Apply a finished ingestion, reporting failures of the current selection
    pub fn apply_ingestion(&mut self, completed: CompletedIngestion) -> IngestionApplied {
        let applied = self
            .state
            .apply_ingestion(&completed.ticket, completed.result);
        match &applied {
            IngestionApplied::Failed(err) => {
                self.reporter.on_ingestion_error(completed.ticket.field, err);
            }
            IngestionApplied::Stored => {
                tracing::debug!("Parsed {} for {}", completed.ticket.file.name, completed.ticket.field);
            }
            IngestionApplied::Stale => {}
        }
        applied
    }

    /// Select a file and ingest it inline
    pub async fn select_and_ingest(&mut self, field: Field, file: RawFile) -> Option<IngestionApplied> {
        let ticket = self.select_file(field, file)?;
        let completed = self.ingest(ticket).await;
        Some(self.apply_ingestion(completed))
    }

    /// Run a submission cycle.
    ///
    /// Returns `None` when validation blocked the submit (all errors become
    /// visible) or a submit is already in flight. Otherwise the form is reset
    /// whatever the outcome.
    pub async fn submit(&mut self) -> Option<SubmissionOutcome> {
        let values = match self.state.handle_submit() {
            SubmitGate::Ready(values) => values,
            SubmitGate::Blocked(errors) => {
                tracing::info!("Submit blocked: {} field(s) need attention", errors.len());
                return None;
            }
            SubmitGate::InFlight => return None,
        };
        let outcome = self.handler.submit(values).await;
        self.state.complete_submit();
        Some(outcome)
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}
