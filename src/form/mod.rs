//! Form domain layer
//!
//! Field model, validation schema and the state machine that ties them together.

#![allow(dead_code)]

mod field;
mod form_state;
mod schema;

pub use field::{Field, FieldValue, FormValues, Gender};
pub use form_state::{FormState, IngestionApplied, IngestionTicket, SubmitGate};

#[cfg(test)]
pub use form_state::FormPhase;
