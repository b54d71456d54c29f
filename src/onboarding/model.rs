//! User record, step-scoped payloads, and the page configuration document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user working through (or finished with) the onboarding flow.
///
/// `current_step` is the next step the user has to complete; a value past 3
/// means onboarding is done. camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque identifier: server-assigned UUID, or millisecond timestamp
    /// when the record was constructed locally.
    pub id: String,
    /// Unique key across the record set. Immutable after step 1.
    pub email: String,
    /// Only travels in step-1 submissions; never included in later payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub current_step: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Construct a record locally when the remote API is unreachable.
    ///
    /// The identifier is derived from the current time in milliseconds, and
    /// `current_step` starts at 2: registration is done, step 2 is next.
    pub fn new_local(email: &str, password: &str) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            email: email.to_string(),
            password: Some(password.to_string()),
            current_step: 2,
            about_me: None,
            street_address: None,
            city: None,
            state: None,
            zip: None,
            birthdate: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a step payload into the record: only provided fields are
    /// overwritten, and `updated_at` is bumped.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(ref about_me) = update.about_me {
            self.about_me = Some(about_me.clone());
        }
        if let Some(ref street_address) = update.street_address {
            self.street_address = Some(street_address.clone());
        }
        if let Some(ref city) = update.city {
            self.city = Some(city.clone());
        }
        if let Some(ref state) = update.state {
            self.state = Some(state.clone());
        }
        if let Some(ref zip) = update.zip {
            self.zip = Some(zip.clone());
        }
        if let Some(birthdate) = update.birthdate {
            self.birthdate = Some(birthdate);
        }
        self.updated_at = Utc::now();
    }

    /// Whether the user has finished all three steps.
    pub fn is_complete(&self) -> bool {
        self.current_step > 3
    }
}

/// Step-1 payload: the fixed credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Step-2/3 payload: the optional profile fields a step's active components
/// collected. Everything is optional; absent means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
}

/// Wire body of `PUT /users/{email}`: a profile payload plus the step the
/// user advanced to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(flatten)]
    pub profile: ProfileUpdate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u8>,
}

/// Admin-controlled mapping of wizard page to active component identifiers.
///
/// Older deployments of the backend emitted snake_case field names; the
/// aliases absorb that at the deserialization boundary so the rest of the
/// code sees one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfiguration {
    #[serde(default, alias = "page2_components")]
    pub page2_components: Vec<String>,
    #[serde(default, alias = "page3_components")]
    pub page3_components: Vec<String>,
}

impl Default for PageConfiguration {
    fn default() -> Self {
        Self {
            page2_components: vec!["about_me".to_string(), "birthdate".to_string()],
            page3_components: vec!["address".to_string()],
        }
    }
}

impl PageConfiguration {
    /// Active identifiers for a wizard page (2 or 3).
    pub fn components_for(&self, page: u8) -> &[String] {
        match page {
            2 => &self.page2_components,
            3 => &self.page3_components,
            _ => &[],
        }
    }

    /// Substitute the hardcoded default for any page with an empty set.
    ///
    /// The admin save path enforces non-emptiness at write time; this covers
    /// documents written before that rule existed.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let page2_components = if self.page2_components.is_empty() {
            tracing::warn!("Page 2 configuration is empty, substituting default");
            defaults.page2_components
        } else {
            self.page2_components
        };
        let page3_components = if self.page3_components.is_empty() {
            tracing::warn!("Page 3 configuration is empty, substituting default");
            defaults.page3_components
        } else {
            self.page3_components
        };
        Self {
            page2_components,
            page3_components,
        }
    }
}
