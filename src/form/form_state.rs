//! Registration form state machine
//!
//! [`FormState`] owns values, touched flags and the derived error map. Every
//! transition recomputes errors before returning, so a reader never sees values
//! and errors out of step.

use super::field::{Field, FieldValue, FormValues, Gender};
use super::schema::{validate, ErrorMap};
use crate::error::IngestionError;
use crate::ingest::{ImageValue, ParsedImage, RawFile};
use std::collections::{BTreeSet, HashMap};

/// Conceptual phase of the form session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    /// Before the first interaction, and after every reset
    #[default]
    Idle,
    /// At least one field has been changed or blurred
    Editing,
    /// A valid submit is being processed
    Submitting,
}

/// Keys an in-flight ingestion to the file selection that started it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionTicket {
    pub field: Field,
    pub generation: u64,
    pub file: RawFile,
}

/// What happened when an ingestion result was handed back to the form
#[derive(Debug)]
pub enum IngestionApplied {
    /// The parsed image replaced the raw handle
    Stored,
    /// A newer selection (or a clear/reset) superseded this ticket
    Stale,
    /// The current selection could not be read; the field was cleared
    Failed(IngestionError),
}

/// Result of a submit trigger
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitGate {
    /// Validation failed; every field is now touched so all errors show
    Blocked(ErrorMap),
    /// Values are valid and the form is now submitting
    Ready(FormValues),
    /// A previous submit is still being processed
    InFlight,
}

/// Values, touched flags and errors for one form session
#[derive(Debug, Clone)]
pub struct FormState {
    values: FormValues,
    touched: BTreeSet<Field>,
    errors: ErrorMap,
    phase: FormPhase,
    submit_count: u32,
    /// Latest selection generation per file field
    generations: HashMap<Field, u64>,
    /// Fields whose current selection is still being ingested
    pending: BTreeSet<Field>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        let values = FormValues::default();
        let errors = validate(&values);
        Self {
            values,
            touched: BTreeSet::new(),
            errors,
            phase: FormPhase::Idle,
            submit_count: 0,
            generations: HashMap::new(),
            pending: BTreeSet::new(),
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn touched_fields(&self) -> &BTreeSet<Field> {
        &self.touched
    }

    /// Whether the current selection for `field` is still being ingested
    pub fn is_ingesting(&self, field: Field) -> bool {
        self.pending.contains(&field)
    }

    pub fn has_pending_ingestion(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Error to display next to `field`: only once touched or after a submit attempt
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.is_touched(field) || self.submit_count > 0 {
            self.errors.get(&field).map(String::as_str)
        } else {
            None
        }
    }

    /// Write a raw typed value into `field`
    pub fn handle_change(&mut self, field: Field, raw: &str) {
        if self.rejects_edits("change", field) {
            return;
        }
        match field {
            Field::Gender => self.values.gender = Gender::from_raw(raw),
            Field::Image => {
                if raw.is_empty() {
                    self.clear_image(field);
                } else {
                    tracing::debug!("Ignoring typed value for {field}; files arrive by selection");
                }
            }
            _ => {
                if let Some(slot) = self.values.text_mut(field) {
                    raw.clone_into(slot);
                }
            }
        }
        self.mark_editing();
        self.revalidate();
    }

    /// Mark `field` as touched
    pub fn handle_blur(&mut self, field: Field) {
        if self.rejects_edits("blur", field) {
            return;
        }
        self.touched.insert(field);
        self.mark_editing();
        self.revalidate();
    }

    /// Set a value from outside direct typing; does not touch the field
    pub fn set_field_value(&mut self, field: Field, value: FieldValue) {
        if self.rejects_edits("set", field) {
            return;
        }
        match (field, value) {
            (Field::Gender, FieldValue::Gender(gender)) => self.values.gender = gender,
            (Field::Gender, FieldValue::Text(raw)) => self.values.gender = Gender::from_raw(&raw),
            (Field::Image, FieldValue::Image(image)) => {
                self.invalidate_selection(field);
                self.values.image = image;
            }
            (_, FieldValue::Text(raw)) => {
                if let Some(slot) = self.values.text_mut(field) {
                    *slot = raw;
                }
            }
            (field, value) => {
                tracing::warn!("Value {value:?} does not fit field {field}");
                return;
            }
        }
        self.revalidate();
    }

    /// Store a newly selected file and hand out the ticket for its ingestion.
    ///
    /// Any ticket issued for an earlier selection on the same field becomes stale.
    /// Returns `None` while submitting or when `field` does not hold files.
    pub fn select_file(&mut self, field: Field, file: RawFile) -> Option<IngestionTicket> {
        if field != Field::Image {
            tracing::warn!("Ignoring file {} selected for non-file field {field}", file.name);
            return None;
        }
        if self.rejects_edits("select", field) {
            return None;
        }
        let generation = self.invalidate_selection(field);
        self.pending.insert(field);
        self.values.image = Some(ImageValue::Raw(file.clone()));
        self.mark_editing();
        self.revalidate();
        Some(IngestionTicket {
            field,
            generation,
            file,
        })
    }

    /// Hand back the result of an ingestion started by [`FormState::select_file`]
    pub fn apply_ingestion(
        &mut self,
        ticket: &IngestionTicket,
        result: Result<ParsedImage, IngestionError>,
    ) -> IngestionApplied {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Discarding stale ingestion of {} for {} (generation {})",
                ticket.file.name,
                ticket.field,
                ticket.generation
            );
            return IngestionApplied::Stale;
        }
        self.pending.remove(&ticket.field);
        let applied = match result {
            Ok(parsed) => {
                self.values.image = Some(ImageValue::Parsed(parsed));
                IngestionApplied::Stored
            }
            Err(err) => {
                self.values.image = None;
                IngestionApplied::Failed(err)
            }
        };
        self.revalidate();
        applied
    }

    /// Submit trigger
    pub fn handle_submit(&mut self) -> SubmitGate {
        if self.phase == FormPhase::Submitting {
            return SubmitGate::InFlight;
        }
        self.submit_count += 1;
        self.revalidate();
        if !self.errors.is_empty() {
            self.touched.extend(Field::ALL);
            self.mark_editing();
            tracing::debug!("Submit blocked by {} invalid field(s)", self.errors.len());
            return SubmitGate::Blocked(self.errors.clone());
        }
        self.phase = FormPhase::Submitting;
        SubmitGate::Ready(self.values.clone())
    }

    /// Finish a submission cycle and return to the initial state
    pub fn complete_submit(&mut self) {
        if self.phase != FormPhase::Submitting {
            tracing::warn!("complete_submit called while {:?}", self.phase);
        }
        self.reset();
    }

    /// Restore defaults; outstanding ingestion tickets become stale
    pub fn reset(&mut self) {
        for field in self.pending.clone() {
            self.invalidate_selection(field);
        }
        self.values = FormValues::default();
        self.touched.clear();
        self.submit_count = 0;
        self.pending.clear();
        self.phase = FormPhase::Idle;
        self.revalidate();
    }

    fn is_current(&self, ticket: &IngestionTicket) -> bool {
        self.generations.get(&ticket.field) == Some(&ticket.generation)
            && self.pending.contains(&ticket.field)
    }

    /// Bump the selection generation so earlier tickets no longer match
    fn invalidate_selection(&mut self, field: Field) -> u64 {
        self.pending.remove(&field);
        let generation = self.generations.entry(field).or_insert(0);
        *generation += 1;
        *generation
    }

    fn clear_image(&mut self, field: Field) {
        self.invalidate_selection(field);
        self.values.image = None;
    }

    fn rejects_edits(&self, action: &str, field: Field) -> bool {
        if self.phase == FormPhase::Submitting {
            tracing::debug!("Ignoring {action} on {field} while submitting");
            return true;
        }
        false
    }

    fn mark_editing(&mut self) {
        if self.phase == FormPhase::Idle {
            self.phase = FormPhase::Editing;
        }
    }

    fn revalidate(&mut self) {
        self.errors = validate(&self.values);
    }
}
