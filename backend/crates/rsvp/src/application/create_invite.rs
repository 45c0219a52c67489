//! Create Invite Use Case (admin)

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::config::RsvpConfig;
use crate::domain::entities::{Invite, NewGuest, NewInvite};
use crate::domain::repository::InviteRepository;
use crate::domain::validation::fields::validate_guest_count;
use crate::domain::validation::payload::{guest_issues, summarize_guest_issues};
use crate::domain::validation::{RawField, RawGuest};
use crate::domain::value_objects::InviteCode;
use crate::error::{RsvpError, RsvpResult};
use serde_json::Value;

pub const FIELD_CODE: &str = "code";
pub const FIELD_GUESTS: &str = "guests";

/// Attempts before giving up on generated codes that keep colliding
const GENERATED_CODE_ATTEMPTS: usize = 3;

/// Untrusted admin input
#[derive(Debug, Clone, Default)]
pub struct CreateInviteInput {
    pub code: RawField,
    pub guests: Vec<RawGuest>,
}

impl CreateInviteInput {
    /// `{ code?, guests: [{ name, dietaryNotes? }] }`. A missing or
    /// non-array `guests` yields no guests.
    pub fn from_json(body: &Value) -> Self {
        Self {
            code: RawField::from_json(body.get("code")),
            guests: body
                .get("guests")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(RawGuest::from_json).collect())
                .unwrap_or_default(),
        }
    }
}

pub struct CreateInviteUseCase<R>
where
    R: InviteRepository,
{
    repo: Arc<R>,
    config: Arc<RsvpConfig>,
}

impl<R> CreateInviteUseCase<R>
where
    R: InviteRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<RsvpConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: CreateInviteInput) -> RsvpResult<Invite> {
        let validation = &self.config.validation;
        let mut errors = BTreeMap::new();

        let requested_code = match &input.code {
            RawField::Absent => None,
            RawField::Text(s) if s.trim().is_empty() => None,
            RawField::Text(s) => match InviteCode::new(s) {
                Ok(code) => Some(code),
                Err(e) => {
                    errors.insert(FIELD_CODE.to_string(), e.to_string());
                    None
                }
            },
            RawField::WrongType => {
                errors.insert(
                    FIELD_CODE.to_string(),
                    "Invite code must be text".to_string(),
                );
                None
            }
        };

        let guests: Vec<NewGuest> = input
            .guests
            .iter()
            .map(|g| NewGuest {
                name: g.name.sanitized(),
                diet_notes: g.dietary_notes.sanitized(),
            })
            .collect();

        if let Err(e) = validate_guest_count(guests.len(), validation) {
            errors.insert(FIELD_GUESTS.to_string(), e.to_string());
        } else {
            let issues: Vec<_> = guests
                .iter()
                .enumerate()
                .flat_map(|(index, g)| {
                    guest_issues(&g.name, &g.diet_notes, validation)
                        .into_iter()
                        .map(move |e| (index + 1, e))
                })
                .collect();
            if let Some(summary) = summarize_guest_issues(&issues) {
                errors.insert(FIELD_GUESTS.to_string(), summary);
            }
        }

        if !errors.is_empty() {
            return Err(RsvpError::ValidationFailed(errors));
        }

        let invite = match requested_code {
            Some(code) => self.repo.create_invite(&NewInvite { code, guests }).await?,
            None => self.create_with_generated_code(guests).await?,
        };

        tracing::info!(
            invite_id = %invite.id,
            code = %invite.code,
            guests = invite.guests.len(),
            "Invite created"
        );

        Ok(invite)
    }

    async fn create_with_generated_code(&self, guests: Vec<NewGuest>) -> RsvpResult<Invite> {
        let mut attempt = 1;
        loop {
            let new_invite = NewInvite {
                code: InviteCode::generate(self.config.invite_code_length),
                guests: guests.clone(),
            };
            match self.repo.create_invite(&new_invite).await {
                Err(RsvpError::InviteCodeTaken) if attempt < GENERATED_CODE_ATTEMPTS => {
                    tracing::warn!(attempt, "Generated invite code collided, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
