//! Submission Validation
//!
//! Untrusted JSON goes through three stages:
//! 1. [`raw`] tags every field as text, absent, or wrong type
//! 2. [`fields`] checks single values against [`ValidationConfig`]
//! 3. [`payload`] sanitizes a whole submission, applies cross-field rules
//!    and builds the guest list to persist

pub mod fields;
pub mod payload;
pub mod raw;

pub use fields::FieldError;
pub use payload::{
    SanitizedGuest, SanitizedSubmission, ValidateOptions, ValidationReport, validate_submission,
};
pub use raw::{RawField, RawGuest, RawGuestList, RawSubmission};

/// Field limits for submissions and new invites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    pub name_max_chars: usize,
    pub dietary_notes_max_chars: usize,
    pub message_max_chars: usize,
    /// Party size bounds, primary guest included
    pub min_guests: usize,
    pub max_guests: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_max_chars: 100,
            dietary_notes_max_chars: 500,
            message_max_chars: 300,
            min_guests: 1,
            max_guests: 20,
        }
    }
}

impl ValidationConfig {
    /// Plus-ones allowed next to the primary guest
    pub fn max_additional_guests(&self) -> usize {
        self.max_guests.saturating_sub(1)
    }
}
