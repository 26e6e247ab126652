//! Form field identifiers and value objects

use crate::ingest::ImageValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format used for the date of birth, matching an HTML date input
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One named slot in the registration record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Password,
    Gender,
    Image,
    DateBirth,
}

impl Field {
    /// All fields in form order
    pub const ALL: [Field; 7] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Password,
        Field::Gender,
        Field::Image,
        Field::DateBirth,
    ];

    /// Wire name used at the event boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::Gender => "gender",
            Self::Image => "image",
            Self::DateBirth => "dateBirth",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::Gender => "Gender",
            Self::Image => "Image",
            Self::DateBirth => "Date of birth",
        }
    }

    /// Whether the field takes free-typed text
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Gender | Self::Image)
    }

    /// Position in form order
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Gender choice; `Unset` until the user picks one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    #[serde(rename = "")]
    Unset,
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse a raw select value; anything unrecognised is `Unset`
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "male" => Self::Male,
            "female" => Self::Female,
            _ => Self::Unset,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Unset => Self::Male,
            Self::Male => Self::Female,
            Self::Female => Self::Unset,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Unset => Self::Female,
            Self::Male => Self::Unset,
            Self::Female => Self::Male,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unset => "Select",
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Value set on a field from outside direct typing
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Gender(Gender),
    Image(Option<ImageValue>),
}

/// Current contents of the registration form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub gender: Gender,
    pub image: Option<ImageValue>,
    /// Raw text as entered; see [`FormValues::date_of_birth`]
    pub date_birth: String,
}

impl FormValues {
    /// Text view of a field; the image field has no text form and yields ""
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::Gender => self.gender.as_str(),
            Field::DateBirth => &self.date_birth,
            Field::Image => "",
        }
    }

    /// Mutable text slot for free-typed fields
    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::FirstName => Some(&mut self.first_name),
            Field::LastName => Some(&mut self.last_name),
            Field::Email => Some(&mut self.email),
            Field::Password => Some(&mut self.password),
            Field::DateBirth => Some(&mut self.date_birth),
            Field::Gender | Field::Image => None,
        }
    }

    /// Parsed date of birth, if the raw text is a valid calendar date
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        parse_date(&self.date_birth)
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
