//! Component registry — static mapping from component identifiers to the
//! concrete user-record fields they own, their required subset, and the
//! render contract used by the terminal forms.

use std::collections::BTreeSet;

/// A concrete field of the user record.
///
/// Form state, validation, and payload filtering are all keyed by this enum
/// rather than by raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Email,
    Password,
    AboutMe,
    StreetAddress,
    City,
    State,
    Zip,
    Birthdate,
}

/// How a field is rendered and read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Secret,
    Multiline,
    Date,
}

impl Field {
    /// Wire name of the field (camelCase, as on the REST API).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::AboutMe => "aboutMe",
            Self::StreetAddress => "streetAddress",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Birthdate => "birthdate",
        }
    }

    /// Human-readable input label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email Address",
            Self::Password => "Password",
            Self::AboutMe => "About Me",
            Self::StreetAddress => "Street Address",
            Self::City => "City",
            Self::State => "State",
            Self::Zip => "ZIP Code",
            Self::Birthdate => "Birthdate",
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Password => InputKind::Secret,
            Self::AboutMe => InputKind::Multiline,
            Self::Birthdate => InputKind::Date,
            _ => InputKind::Text,
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::AboutMe => Some("Tell us about yourself..."),
            Self::Zip => Some("ZIP Code (5 digits)"),
            Self::Birthdate => Some("YYYY-MM-DD"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A toggle-able unit of profile data collection.
///
/// Steps 2 and 3 are configured as ordered lists of these; step 1 is always
/// `[Email, Password]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComponentId {
    Email,
    Password,
    AboutMe,
    Address,
    Birthdate,
}

impl ComponentId {
    /// Stable identifier as stored in the page configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::AboutMe => "about_me",
            Self::Address => "address",
            Self::Birthdate => "birthdate",
        }
    }

    /// Parse a configured identifier. Unknown identifiers yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            "about_me" => Some(Self::AboutMe),
            "address" => Some(Self::Address),
            "birthdate" => Some(Self::Birthdate),
            _ => None,
        }
    }

    /// Section label shown above the component's inputs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::AboutMe => "About Me",
            Self::Address => "Address Information",
            Self::Birthdate => "Birthdate",
        }
    }

    /// The components an operator can toggle onto pages 2 and 3.
    pub fn toggleable() -> &'static [ComponentId] {
        &[Self::AboutMe, Self::Address, Self::Birthdate]
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry entry: the fields a component owns and the subset that must be
/// non-empty for the component's step to submit.
#[derive(Debug, Clone, Copy)]
pub struct ComponentDefinition {
    pub id: ComponentId,
    pub owned_fields: &'static [Field],
    pub required_fields: &'static [Field],
}

static EMAIL_DEF: ComponentDefinition = ComponentDefinition {
    id: ComponentId::Email,
    owned_fields: &[Field::Email],
    required_fields: &[Field::Email],
};

static PASSWORD_DEF: ComponentDefinition = ComponentDefinition {
    id: ComponentId::Password,
    owned_fields: &[Field::Password],
    required_fields: &[Field::Password],
};

static ABOUT_ME_DEF: ComponentDefinition = ComponentDefinition {
    id: ComponentId::AboutMe,
    owned_fields: &[Field::AboutMe],
    required_fields: &[Field::AboutMe],
};

// One toggle, four fields.
static ADDRESS_DEF: ComponentDefinition = ComponentDefinition {
    id: ComponentId::Address,
    owned_fields: &[Field::StreetAddress, Field::City, Field::State, Field::Zip],
    required_fields: &[Field::StreetAddress, Field::City, Field::State, Field::Zip],
};

static BIRTHDATE_DEF: ComponentDefinition = ComponentDefinition {
    id: ComponentId::Birthdate,
    owned_fields: &[Field::Birthdate],
    required_fields: &[Field::Birthdate],
};

/// Definition lookup. Total over the known identifier set.
pub fn definition(id: ComponentId) -> &'static ComponentDefinition {
    match id {
        ComponentId::Email => &EMAIL_DEF,
        ComponentId::Password => &PASSWORD_DEF,
        ComponentId::AboutMe => &ABOUT_ME_DEF,
        ComponentId::Address => &ADDRESS_DEF,
        ComponentId::Birthdate => &BIRTHDATE_DEF,
    }
}

/// Fields owned by a component.
pub fn owned_fields(id: ComponentId) -> &'static [Field] {
    definition(id).owned_fields
}

/// Required fields of a component.
pub fn required_fields(id: ComponentId) -> &'static [Field] {
    definition(id).required_fields
}

/// Union of the required fields over a set of components. Each component is
/// expanded to its full required set before merging, so callers validate
/// once with the aggregate.
pub fn aggregate_required(components: &[ComponentId]) -> BTreeSet<Field> {
    components
        .iter()
        .flat_map(|c| required_fields(*c).iter().copied())
        .collect()
}

/// Resolve configured identifiers to known components.
///
/// An unknown identifier is a configuration error, not a fatal one: it is
/// skipped with a diagnostic so the rest of the step still renders.
pub fn resolve(identifiers: &[String]) -> Vec<ComponentId> {
    identifiers
        .iter()
        .filter_map(|id| match ComponentId::parse(id) {
            Some(component) => Some(component),
            None => {
                tracing::warn!(component = %id, "Unknown component identifier in configuration, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_identifiers_roundtrip() {
        for id in [
            ComponentId::Email,
            ComponentId::Password,
            ComponentId::AboutMe,
            ComponentId::Address,
            ComponentId::Birthdate,
        ] {
            assert_eq!(ComponentId::parse(id.as_str()), Some(id));
        }
        assert_eq!(ComponentId::parse("confetti"), None);
    }

    #[test]
    fn address_expands_to_four_required_fields() {
        let required = aggregate_required(&[ComponentId::Address]);
        assert_eq!(required.len(), 4);
        assert!(required.contains(&Field::StreetAddress));
        assert!(required.contains(&Field::City));
        assert!(required.contains(&Field::State));
        assert!(required.contains(&Field::Zip));
    }

    #[test]
    fn aggregation_is_union_and_order_independent() {
        let forward = aggregate_required(&[ComponentId::AboutMe, ComponentId::Address, ComponentId::Birthdate]);
        let backward = aggregate_required(&[ComponentId::Birthdate, ComponentId::Address, ComponentId::AboutMe]);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 6);

        // Duplicates collapse
        let doubled = aggregate_required(&[ComponentId::Address, ComponentId::Address]);
        assert_eq!(doubled.len(), 4);
    }

    #[test]
    fn resolve_skips_unknown_identifiers() {
        let configured = vec![
            "about_me".to_string(),
            "holograms".to_string(),
            "address".to_string(),
        ];
        let resolved = resolve(&configured);
        assert_eq!(resolved, vec![ComponentId::AboutMe, ComponentId::Address]);
    }

    #[test]
    fn every_owned_field_has_a_render_contract() {
        for id in [
            ComponentId::Email,
            ComponentId::Password,
            ComponentId::AboutMe,
            ComponentId::Address,
            ComponentId::Birthdate,
        ] {
            for field in owned_fields(id) {
                assert!(!field.label().is_empty());
                assert!(!field.wire_name().is_empty());
            }
        }
    }

    #[test]
    fn required_is_subset_of_owned() {
        for id in [
            ComponentId::Email,
            ComponentId::Password,
            ComponentId::AboutMe,
            ComponentId::Address,
            ComponentId::Birthdate,
        ] {
            let owned: BTreeSet<Field> = owned_fields(id).iter().copied().collect();
            for field in required_fields(id) {
                assert!(owned.contains(field), "{id}: {field} required but not owned");
            }
        }
    }
}
