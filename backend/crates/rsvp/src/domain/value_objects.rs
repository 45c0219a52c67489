//! Domain Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// AttendanceStatus
// ============================================================================

/// Whether a guest will attend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Attending,
    NotAttending,
    /// No answer yet
    #[default]
    Unselected,
}

impl AttendanceStatus {
    /// String code used in payloads and in the database
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Attending => "ATTENDING",
            Self::NotAttending => "NOT_ATTENDING",
            Self::Unselected => "UNSELECTED",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ATTENDING" => Some(Self::Attending),
            "NOT_ATTENDING" => Some(Self::NotAttending),
            "UNSELECTED" => Some(Self::Unselected),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_attending(&self) -> bool {
        matches!(self, Self::Attending)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// InviteCode
// ============================================================================

pub const INVITE_CODE_MIN_LENGTH: usize = 4;
pub const INVITE_CODE_MAX_LENGTH: usize = 32;

/// Alphabet for generated codes. No `0/O` or `1/I/L` so codes survive
/// being read aloud or copied from a printed card.
const GENERATED_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InviteCodeError {
    #[error("Invite code is required")]
    Empty,

    #[error("Invite code must be between {min} and {max} characters")]
    InvalidLength { length: usize, min: usize, max: usize },

    #[error("Invite code can only contain letters and numbers")]
    InvalidCharacter { char: char },
}

/// Normalized invite code
///
/// # Invariants
/// - Trimmed and upper-cased
/// - ASCII alphanumeric only
/// - Length between INVITE_CODE_MIN_LENGTH and INVITE_CODE_MAX_LENGTH
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    pub fn new(input: impl AsRef<str>) -> Result<Self, InviteCodeError> {
        let canonical = input.as_ref().trim().to_ascii_uppercase();

        if canonical.is_empty() {
            return Err(InviteCodeError::Empty);
        }

        if let Some(c) = canonical.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(InviteCodeError::InvalidCharacter { char: c });
        }

        let length = canonical.len();
        if !(INVITE_CODE_MIN_LENGTH..=INVITE_CODE_MAX_LENGTH).contains(&length) {
            return Err(InviteCodeError::InvalidLength {
                length,
                min: INVITE_CODE_MIN_LENGTH,
                max: INVITE_CODE_MAX_LENGTH,
            });
        }

        Ok(Self(canonical))
    }

    /// Random code of `length` characters (clamped to the valid range)
    pub fn generate(length: usize) -> Self {
        let length = length.clamp(INVITE_CODE_MIN_LENGTH, INVITE_CODE_MAX_LENGTH);
        Self(platform::crypto::random_string(GENERATED_CODE_ALPHABET, length))
    }

    /// Rebuild from a stored value (assumes already validated)
    pub fn from_db(stored: String) -> Self {
        Self(stored)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InviteCode {
    type Error = InviteCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}
