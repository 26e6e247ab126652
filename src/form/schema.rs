//! Declarative validation schema for the registration form
//!
//! Each field carries a static list of rules. [`validate`] walks the table and
//! keeps the first failing message per field.

use super::field::{parse_date, Field, FormValues};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Image MIME types the form accepts
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Per-field validation messages; fields without an entry are valid
pub type ErrorMap = BTreeMap<Field, String>;

/// HTML living-standard email grammar
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// A single check applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Value present and non-empty
    Required,
    /// At least this many characters
    MinLength(usize),
    /// Well-formed email address
    Email,
    /// One of the listed values
    OneOf(&'static [&'static str]),
    /// A valid calendar date
    Date,
    /// If a file is present, its declared type is listed. Absence passes.
    MimeType(&'static [&'static str]),
}

/// A check paired with the message shown when it fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub check: Check,
    pub message: &'static str,
}

const fn rule(check: Check, message: &'static str) -> Rule {
    Rule { check, message }
}

/// Rules for one field, evaluated in order
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: Field,
    pub rules: &'static [Rule],
}

/// The registration schema
pub static SCHEMA: &[FieldRules] = &[
    FieldRules {
        field: Field::FirstName,
        rules: &[rule(Check::Required, "First name is required")],
    },
    FieldRules {
        field: Field::LastName,
        rules: &[rule(Check::Required, "Last name is required")],
    },
    FieldRules {
        field: Field::Email,
        rules: &[
            rule(Check::Required, "Email is required"),
            rule(Check::Email, "Invalid email address"),
        ],
    },
    FieldRules {
        field: Field::Password,
        rules: &[
            rule(Check::Required, "Password is required"),
            rule(
                Check::MinLength(MIN_PASSWORD_LENGTH),
                "Password must be at least 6 characters",
            ),
        ],
    },
    FieldRules {
        field: Field::Gender,
        rules: &[
            rule(Check::Required, "Gender is required"),
            rule(Check::OneOf(&["male", "female"]), "Gender is required"),
        ],
    },
    FieldRules {
        field: Field::Image,
        rules: &[rule(Check::MimeType(ACCEPTED_IMAGE_TYPES), "Invalid file type")],
    },
    FieldRules {
        field: Field::DateBirth,
        rules: &[
            rule(Check::Required, "Date of birth is required"),
            rule(Check::Date, "Date of birth is required"),
        ],
    },
];

/// Compute the error map for a snapshot of values
pub fn validate(values: &FormValues) -> ErrorMap {
    SCHEMA
        .iter()
        .filter_map(|entry| {
            entry
                .rules
                .iter()
                .find(|r| !passes(r.check, values, entry.field))
                .map(|r| (entry.field, r.message.to_string()))
        })
        .collect()
}

/// Rules declared for `field`
pub fn rules_for(field: Field) -> &'static [Rule] {
    SCHEMA
        .iter()
        .find(|entry| entry.field == field)
        .map(|entry| entry.rules)
        .unwrap_or(&[])
}

fn passes(check: Check, values: &FormValues, field: Field) -> bool {
    if let Check::MimeType(allowed) = check {
        return match field {
            Field::Image => values
                .image
                .as_ref()
                .is_none_or(|image| allowed.iter().any(|m| *m == image.mime_type())),
            _ => true,
        };
    }

    let text = values.text(field);
    match check {
        Check::Required => match field {
            Field::Image => values.image.is_some(),
            _ => !text.is_empty(),
        },
        Check::MinLength(min) => text.chars().count() >= min,
        Check::Email => EMAIL_REGEX.is_match(text),
        Check::OneOf(allowed) => allowed.iter().any(|a| *a == text),
        Check::Date => parse_date(text).is_some(),
        Check::MimeType(_) => true,
    }
}
