//! API DTOs (Data Transfer Objects)
//!
//! Request bodies for POST routes are read as `serde_json::Value` and
//! tagged by `domain::validation::raw`, so only query strings and
//! responses have types here.

use crate::domain::entities::{Guest, Invite};
use crate::domain::value_objects::AttendanceStatus;
use platform::csrf::IssuedCsrfToken;
use platform::sanitize::sanitize_for_display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for GET /api/csrf
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub token: String,
    pub expires_at_ms: i64,
}

impl From<&IssuedCsrfToken> for CsrfTokenResponse {
    fn from(issued: &IssuedCsrfToken) -> Self {
        Self {
            token: issued.token.clone(),
            expires_at_ms: issued.expires_at_ms,
        }
    }
}

/// Query for GET /api/rsvp
#[derive(Debug, Clone, Deserialize)]
pub struct InviteQuery {
    #[serde(default)]
    pub code: Option<String>,
}

/// Query for GET /api/guests/search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDto {
    pub id: Uuid,
    pub name: String,
    pub dietary_notes: String,
    pub status: AttendanceStatus,
    pub is_primary: bool,
}

impl From<&Guest> for GuestDto {
    fn from(guest: &Guest) -> Self {
        Self {
            id: guest.id.into_uuid(),
            name: guest.name.clone(),
            dietary_notes: guest.diet_notes.clone(),
            status: guest.status,
            is_primary: guest.is_primary,
        }
    }
}

/// Invite with its party, for GET/POST /api/rsvp and admin creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub code: String,
    pub message: String,
    pub responded_at_ms: Option<i64>,
    pub guests: Vec<GuestDto>,
}

impl From<&Invite> for InviteResponse {
    fn from(invite: &Invite) -> Self {
        Self {
            code: invite.code.to_string(),
            message: invite.message.clone(),
            responded_at_ms: invite.responded_at_ms,
            guests: invite.guests.iter().map(GuestDto::from).collect(),
        }
    }
}

/// One autocomplete suggestion
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: Uuid,
    pub name: String,
    /// HTML-escaped name, safe to insert as markup
    pub label: String,
}

impl From<&Guest> for SearchResult {
    fn from(guest: &Guest) -> Self {
        Self {
            id: guest.id.into_uuid(),
            name: guest.name.clone(),
            label: sanitize_for_display(&guest.name),
        }
    }
}

/// Response for GET /api/guests/search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
