//! RSVP Payload Validator
//!
//! Turns a [`RawSubmission`] into the guest list to persist, collecting
//! field errors keyed by the request field names (`name`, `dietaryNotes`,
//! `message`, `additionalGuests`, `attending`). Any error blocks the whole
//! submission; nothing is coerced into a best guess except `attending`,
//! which falls back to `UNSELECTED`.

use std::collections::BTreeMap;

use super::ValidationConfig;
use super::fields::{
    FieldError, validate_dietary_notes, validate_guest_count, validate_message, validate_name,
};
use super::raw::{RawField, RawGuest, RawSubmission};
use crate::domain::entities::{ResponseGuest, RsvpResponse};
use crate::domain::value_objects::AttendanceStatus;
use kernel::id::GuestId;

pub const FIELD_NAME: &str = "name";
pub const FIELD_DIETARY_NOTES: &str = "dietaryNotes";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_ADDITIONAL_GUESTS: &str = "additionalGuests";
pub const FIELD_ATTENDING: &str = "attending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidateOptions {
    /// Reject `UNSELECTED`. Set for first responses, not for updates.
    pub require_attendance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedGuest {
    pub id: Option<GuestId>,
    pub name: String,
    pub diet_notes: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanitizedSubmission {
    pub id: Option<GuestId>,
    pub name: String,
    pub dietary_notes: String,
    pub message: String,
    pub attending: AttendanceStatus,
    /// Empty unless `attending` is `ATTENDING`
    pub additional_guests: Vec<SanitizedGuest>,
    /// Primary guest first, then the additional guests
    pub guests: Vec<SanitizedGuest>,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
    pub sanitized: SanitizedSubmission,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The response to persist, or the field errors.
    pub fn into_response(self) -> Result<RsvpResponse, BTreeMap<String, String>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let guests = self
            .sanitized
            .guests
            .into_iter()
            .map(|g| ResponseGuest {
                id: g.id,
                name: g.name,
                diet_notes: g.diet_notes,
                status: g.status,
            })
            .collect();

        Ok(RsvpResponse {
            message: self.sanitized.message,
            guests,
        })
    }
}

pub fn validate_submission(
    raw: &RawSubmission,
    options: ValidateOptions,
    config: &ValidationConfig,
) -> ValidationReport {
    let mut errors = BTreeMap::new();

    let name = raw.name.sanitized();
    let dietary_notes = raw.dietary_notes.sanitized();
    let message = raw.message.sanitized();
    let attending = coerce_attendance(&raw.attending);

    let submitted = raw.additional_guests.entries();
    let mut additional_guests: Vec<SanitizedGuest> = submitted
        .iter()
        .take(config.max_additional_guests())
        .map(sanitize_guest)
        .collect();

    record(&mut errors, FIELD_NAME, validate_name(&name, config));
    record(
        &mut errors,
        FIELD_DIETARY_NOTES,
        validate_dietary_notes(&dietary_notes, config),
    );
    record(&mut errors, FIELD_MESSAGE, validate_message(&message, config));

    // Count uses what was submitted, not what was kept
    if let Err(e) = validate_guest_count(1 + submitted.len(), config) {
        errors.insert(FIELD_ADDITIONAL_GUESTS.to_string(), e.to_string());
    } else {
        let issues = additional_guests
            .iter()
            .enumerate()
            .flat_map(|(index, guest)| {
                let position = index + 2;
                guest_issues(&guest.name, &guest.diet_notes, config)
                    .into_iter()
                    .map(move |e| (position, e))
            })
            .collect::<Vec<_>>();
        if let Some(summary) = summarize_guest_issues(&issues) {
            errors.insert(FIELD_ADDITIONAL_GUESTS.to_string(), summary);
        }
    }

    if !attending.is_attending() {
        additional_guests.clear();
    }

    if options.require_attendance && attending == AttendanceStatus::Unselected {
        errors.insert(
            FIELD_ATTENDING.to_string(),
            FieldError::AttendanceRequired.to_string(),
        );
    }

    let id = raw.id.as_text().and_then(|s| GuestId::parse(s.trim()));
    let mut guests = Vec::with_capacity(1 + additional_guests.len());
    guests.push(SanitizedGuest {
        id,
        name: name.clone(),
        diet_notes: dietary_notes.clone(),
        status: attending,
    });
    guests.extend(additional_guests.iter().cloned());

    ValidationReport {
        errors,
        sanitized: SanitizedSubmission {
            id,
            name,
            dietary_notes,
            message,
            attending,
            additional_guests,
            guests,
        },
    }
}

/// Name and dietary-notes problems of one guest, in that order
pub fn guest_issues(name: &str, diet_notes: &str, config: &ValidationConfig) -> Vec<FieldError> {
    [
        validate_name(name, config),
        validate_dietary_notes(diet_notes, config),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// One message for a list of `(guest position, issue)`:
/// `"Guest 2: Name is required (and 3 more)"`.
pub fn summarize_guest_issues(issues: &[(usize, FieldError)]) -> Option<String> {
    let (position, first) = issues.first()?;
    let mut summary = format!("Guest {position}: {first}");
    if issues.len() > 1 {
        summary.push_str(&format!(" (and {} more)", issues.len() - 1));
    }
    Some(summary)
}

fn coerce_attendance(field: &RawField) -> AttendanceStatus {
    field
        .as_text()
        .and_then(|s| AttendanceStatus::from_code(s.trim()))
        .unwrap_or_default()
}

fn sanitize_guest(raw: &RawGuest) -> SanitizedGuest {
    SanitizedGuest {
        id: raw.id.as_text().and_then(|s| GuestId::parse(s.trim())),
        name: raw.name.sanitized(),
        diet_notes: raw.dietary_notes.sanitized(),
        status: AttendanceStatus::Attending,
    }
}

fn record(errors: &mut BTreeMap<String, String>, field: &str, result: Result<(), FieldError>) {
    if let Err(e) = result {
        errors.insert(field.to_string(), e.to_string());
    }
}
