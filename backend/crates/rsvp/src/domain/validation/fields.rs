//! Field Validators
//!
//! Each validator checks one already-sanitized value. The `Display` text of
//! [`FieldError`] is shown to guests next to the form field.

use super::ValidationConfig;
use thiserror::Error;

const NAME_PUNCTUATION: &[char] = &['-', '\'', '\u{2019}', '.'];
const DIETARY_PUNCTUATION: &[char] = &['-', ':', ';', '\'', ',', '.', '/', '(', ')', '&'];
const MESSAGE_PUNCTUATION: &[char] = &['-', ',', '.', '!', '?', '(', ')'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be {max} characters or less")]
    NameTooLong { max: usize },

    #[error("Name can only contain letters, spaces, hyphens, apostrophes, and periods")]
    NameInvalidCharacters,

    #[error("Dietary notes must be {max} characters or less")]
    DietaryNotesTooLong { max: usize },

    #[error("Dietary notes can only contain letters, numbers, spaces, and basic punctuation")]
    DietaryNotesInvalidCharacters,

    #[error("Message must be {max} characters or less")]
    MessageTooLong { max: usize },

    #[error("Message can only contain letters, numbers, spaces, and basic punctuation")]
    MessageInvalidCharacters,

    #[error("At least {min} guest is required")]
    TooFewGuests { min: usize },

    #[error("Maximum {max} guests allowed per invitation")]
    TooManyGuests { max: usize },

    #[error("Please let us know if you will attend")]
    AttendanceRequired,
}

pub fn validate_name(name: &str, config: &ValidationConfig) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::NameRequired);
    }
    if name.chars().count() > config.name_max_chars {
        return Err(FieldError::NameTooLong {
            max: config.name_max_chars,
        });
    }
    let allowed = |c: char| c.is_alphabetic() || c.is_whitespace() || NAME_PUNCTUATION.contains(&c);
    if !name.chars().all(allowed) {
        return Err(FieldError::NameInvalidCharacters);
    }
    Ok(())
}

/// Empty is valid.
pub fn validate_dietary_notes(notes: &str, config: &ValidationConfig) -> Result<(), FieldError> {
    if notes.chars().count() > config.dietary_notes_max_chars {
        return Err(FieldError::DietaryNotesTooLong {
            max: config.dietary_notes_max_chars,
        });
    }
    if !notes.chars().all(|c| is_plain_text(c, DIETARY_PUNCTUATION)) {
        return Err(FieldError::DietaryNotesInvalidCharacters);
    }
    Ok(())
}

/// Empty is valid.
pub fn validate_message(message: &str, config: &ValidationConfig) -> Result<(), FieldError> {
    if message.chars().count() > config.message_max_chars {
        return Err(FieldError::MessageTooLong {
            max: config.message_max_chars,
        });
    }
    if !message.chars().all(|c| is_plain_text(c, MESSAGE_PUNCTUATION)) {
        return Err(FieldError::MessageInvalidCharacters);
    }
    Ok(())
}

/// Party size, primary guest included
pub fn validate_guest_count(count: usize, config: &ValidationConfig) -> Result<(), FieldError> {
    if count < config.min_guests {
        return Err(FieldError::TooFewGuests {
            min: config.min_guests,
        });
    }
    if count > config.max_guests {
        return Err(FieldError::TooManyGuests {
            max: config.max_guests,
        });
    }
    Ok(())
}

fn is_plain_text(c: char, punctuation: &[char]) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || punctuation.contains(&c)
}
