//! Raw Submission Representation
//!
//! Request bodies are read as `serde_json::Value` and every field is tagged
//! before anything looks at its content. A number where a name belongs is
//! `WrongType`, not a parse failure: it sanitizes to the empty string and is
//! then reported by the regular field validators.

use platform::sanitize::sanitize_input;
use serde_json::{Map, Value};

/// One untrusted scalar field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawField {
    Text(String),
    /// Missing or `null`
    #[default]
    Absent,
    WrongType,
}

impl RawField {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(_) => Self::WrongType,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Absent | Self::WrongType => None,
        }
    }

    /// Sanitized text; empty for anything that is not a string
    pub fn sanitized(&self) -> String {
        self.as_text().map(sanitize_input).unwrap_or_default()
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One entry of `additionalGuests`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawGuest {
    pub id: RawField,
    pub name: RawField,
    pub dietary_notes: RawField,
}

impl RawGuest {
    pub fn named(name: &str) -> Self {
        Self {
            name: RawField::from(name),
            ..Self::default()
        }
    }

    /// A non-object entry yields a guest whose fields are all `WrongType`.
    pub fn from_json(value: &Value) -> Self {
        match value.as_object() {
            Some(obj) => Self {
                id: RawField::from_json(obj.get("id")),
                name: RawField::from_json(obj.get("name")),
                dietary_notes: RawField::from_json(obj.get("dietaryNotes")),
            },
            None => Self {
                id: RawField::WrongType,
                name: RawField::WrongType,
                dietary_notes: RawField::WrongType,
            },
        }
    }
}

/// The `additionalGuests` field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawGuestList {
    Entries(Vec<RawGuest>),
    #[default]
    Absent,
    WrongType,
}

impl RawGuestList {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Array(items)) => Self::Entries(items.iter().map(RawGuest::from_json).collect()),
            Some(_) => Self::WrongType,
        }
    }

    /// Submitted entries; empty unless the field was an array
    pub fn entries(&self) -> &[RawGuest] {
        match self {
            Self::Entries(guests) => guests,
            Self::Absent | Self::WrongType => &[],
        }
    }
}

/// A whole RSVP submission as received
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawSubmission {
    /// Primary guest id
    pub id: RawField,
    pub name: RawField,
    pub attending: RawField,
    pub dietary_notes: RawField,
    pub message: RawField,
    pub additional_guests: RawGuestList,
}

impl RawSubmission {
    /// Tag the fields of a JSON body. A non-object body yields an
    /// all-`Absent` submission, which then fails validation normally.
    pub fn from_json(body: &Value) -> Self {
        let empty = Map::new();
        let obj = body.as_object().unwrap_or(&empty);

        Self {
            id: RawField::from_json(obj.get("id")),
            name: RawField::from_json(obj.get("name")),
            attending: RawField::from_json(obj.get("attending")),
            dietary_notes: RawField::from_json(obj.get("dietaryNotes")),
            message: RawField::from_json(obj.get("message")),
            additional_guests: RawGuestList::from_json(obj.get("additionalGuests")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_tags() {
        assert_eq!(RawField::from_json(None), RawField::Absent);
        assert_eq!(RawField::from_json(Some(&Value::Null)), RawField::Absent);
        assert_eq!(RawField::from_json(Some(&json!("x"))), RawField::text("x"));
        assert_eq!(RawField::from_json(Some(&json!(42))), RawField::WrongType);
        assert_eq!(RawField::from_json(Some(&json!(["x"]))), RawField::WrongType);
    }

    #[test]
    fn test_non_text_sanitizes_to_empty() {
        assert_eq!(RawField::WrongType.sanitized(), "");
        assert_eq!(RawField::Absent.sanitized(), "");
        assert_eq!(RawField::text("  <Jane>  ").sanitized(), "Jane");
    }

    #[test]
    fn test_submission_from_json() {
        let raw = RawSubmission::from_json(&json!({
            "name": "Jane Doe",
            "attending": "ATTENDING",
            "dietaryNotes": null,
            "message": 7,
            "additionalGuests": [{ "name": "Bob", "dietaryNotes": "vegan" }, "Carol"]
        }));

        assert_eq!(raw.id, RawField::Absent);
        assert_eq!(raw.name, RawField::text("Jane Doe"));
        assert_eq!(raw.dietary_notes, RawField::Absent);
        assert_eq!(raw.message, RawField::WrongType);

        let guests = raw.additional_guests.entries();
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].dietary_notes, RawField::text("vegan"));
        assert_eq!(guests[1].name, RawField::WrongType);
    }

    #[test]
    fn test_guest_list_wrong_type_has_no_entries() {
        let raw = RawSubmission::from_json(&json!({ "additionalGuests": "Bob" }));
        assert_eq!(raw.additional_guests, RawGuestList::WrongType);
        assert!(raw.additional_guests.entries().is_empty());
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(RawSubmission::from_json(&json!("hello")), RawSubmission::default());
    }
}
