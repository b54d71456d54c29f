//! Step form engine — field edits, validation, and payload filtering for a
//! single wizard step.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::registry::{self, ComponentId, Field};
use crate::validation::{self, ValidationErrors};

use super::model::{Credentials, ProfileUpdate, UserRecord};

/// Editable field state for the step being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<Field, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize from a prior record so re-rendering a step never loses
    /// previously entered data. Prefilling twice from the same record gives
    /// the same state.
    pub fn prefill(record: &UserRecord) -> Self {
        let mut form = Self::new();
        form.set(Field::Email, record.email.clone());
        if let Some(ref password) = record.password {
            form.set(Field::Password, password.clone());
        }
        if let Some(ref about_me) = record.about_me {
            form.set(Field::AboutMe, about_me.clone());
        }
        if let Some(ref street_address) = record.street_address {
            form.set(Field::StreetAddress, street_address.clone());
        }
        if let Some(ref city) = record.city {
            form.set(Field::City, city.clone());
        }
        if let Some(ref state) = record.state {
            form.set(Field::State, state.clone());
        }
        if let Some(ref zip) = record.zip {
            form.set(Field::Zip, zip.clone());
        }
        if let Some(birthdate) = record.birthdate {
            form.set(Field::Birthdate, birthdate.format("%Y-%m-%d").to_string());
        }
        form
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Validate and filter the accumulated edits for submission.
    ///
    /// The required set is the union over the active components' required
    /// fields; every failure is collected, and nothing is emitted unless all
    /// of them pass. The payload contains only non-empty fields owned by an
    /// active component, and never the password once past step 1.
    pub fn submit(
        &self,
        step: u8,
        active: &[ComponentId],
    ) -> Result<FilteredPayload, ValidationErrors> {
        let required = registry::aggregate_required(active);
        let errors = validation::validate_form(&self.values, &required);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut payload = FilteredPayload::default();
        for component in active {
            for field in registry::owned_fields(*component) {
                if *field == Field::Password && step > 1 {
                    continue;
                }
                let value = self.get(*field).trim();
                if !value.is_empty() {
                    payload.values.insert(*field, value.to_string());
                }
            }
        }
        Ok(payload)
    }
}

/// The validated, filtered output of a step submission: only fields owned
/// by the step's active components, only where non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredPayload {
    values: BTreeMap<Field, String>,
}

impl FilteredPayload {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// The credential pair, when this was a step-1 submission.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            email: self.get(Field::Email)?.to_string(),
            password: self.get(Field::Password)?.to_string(),
        })
    }

    /// Convert into the typed profile payload for steps 2 and 3.
    pub fn profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            about_me: self.get(Field::AboutMe).map(String::from),
            street_address: self.get(Field::StreetAddress).map(String::from),
            city: self.get(Field::City).map(String::from),
            state: self.get(Field::State).map(String::from),
            zip: self.get(Field::Zip).map(String::from),
            // Validated upstream; an unparsable date cannot reach here.
            birthdate: self
                .get(Field::Birthdate)
                .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()),
        }
    }
}
