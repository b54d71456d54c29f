//! Validation engine — pure field validators and whole-form validation
//! against a required-field set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::registry::Field;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").unwrap());

/// Minimum password length.
const PASSWORD_MIN_LEN: usize = 6;

pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LEN
}

/// ZIP codes are exactly five digits.
pub fn valid_zip(zip: &str) -> bool {
    ZIP_RE.is_match(zip)
}

/// A birthdate is a `YYYY-MM-DD` date strictly earlier than today.
/// Time of day plays no part: today itself is rejected, yesterday passes.
pub fn valid_birthdate(birthdate: &str) -> bool {
    match NaiveDate::parse_from_str(birthdate, "%Y-%m-%d") {
        Ok(date) => date < Utc::now().date_naive(),
        Err(_) => false,
    }
}

/// Validate a single field value, returning a human-readable message on
/// failure. An empty value always fails with the field's "required" message.
pub fn validation_message(field: Field, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(required_message(field).to_string());
    }

    match field {
        Field::Email if !valid_email(value) => {
            Some("Please enter a valid email address".to_string())
        }
        Field::Password if !valid_password(value) => {
            Some(format!("Password must be at least {PASSWORD_MIN_LEN} characters"))
        }
        Field::Zip if !valid_zip(value) => {
            Some("ZIP code must be exactly 5 digits".to_string())
        }
        Field::Birthdate if !valid_birthdate(value) => {
            Some("Birthdate must be in the past".to_string())
        }
        _ => None,
    }
}

fn required_message(field: Field) -> &'static str {
    match field {
        Field::Email => "Email is required",
        Field::Password => "Password is required",
        Field::AboutMe => "About me is required",
        Field::StreetAddress => "Street address is required",
        Field::City => "City is required",
        Field::State => "State is required",
        Field::Zip => "ZIP code is required",
        Field::Birthdate => "Birthdate is required",
    }
}

/// Field-level validation failures, keyed by field.
///
/// These are recoverable form data, surfaced inline to the user; they never
/// travel past the form engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn insert(&mut self, field: Field, message: String) {
        self.errors.insert(field, message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// Validate every required field, collecting all failures rather than
/// stopping at the first.
pub fn validate_form(
    values: &BTreeMap<Field, String>,
    required: &BTreeSet<Field>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for field in required {
        let value = values.get(field).map(String::as_str).unwrap_or("");
        if let Some(message) = validation_message(*field, value) {
            errors.insert(*field, message);
        }
    }
    errors
}
