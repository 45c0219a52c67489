//! Submit RSVP Use Case

use crate::application::config::RsvpConfig;
use crate::application::get_invite::parse_invite_code;
use crate::domain::entities::Invite;
use crate::domain::repository::InviteRepository;
use crate::domain::validation::{RawField, RawSubmission, ValidateOptions, validate_submission};
use crate::error::{RsvpError, RsvpResult};
use serde_json::Value;
use std::sync::Arc;

pub struct SubmitRsvpUseCase<R>
where
    R: InviteRepository,
{
    repo: Arc<R>,
    config: Arc<RsvpConfig>,
}

impl<R> SubmitRsvpUseCase<R>
where
    R: InviteRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<RsvpConfig>) -> Self {
        Self { repo, config }
    }

    /// Validate and store a party's response.
    ///
    /// `body` is the untrusted JSON request body. A first response must
    /// pick an attendance option; later updates may leave it unselected.
    pub async fn execute(&self, body: &Value) -> RsvpResult<Invite> {
        let code_field = RawField::from_json(body.get("code"));
        let code = parse_invite_code(code_field.as_text())?;

        let invite = self
            .repo
            .find_by_code(&code)
            .await?
            .ok_or(RsvpError::InviteNotFound)?;

        let options = ValidateOptions {
            require_attendance: !invite.has_responded(),
        };
        let raw = RawSubmission::from_json(body);
        let report = validate_submission(&raw, options, &self.config.validation);

        let response = report.into_response().map_err(|errors| {
            tracing::debug!(
                invite_id = %invite.id,
                fields = ?errors.keys().collect::<Vec<_>>(),
                "RSVP validation failed"
            );
            RsvpError::ValidationFailed(errors)
        })?;

        let updated = self.repo.save_response(invite.id, &response).await?;

        tracing::info!(
            invite_id = %updated.id,
            status = response.guests.first().map(|g| g.status.code()).unwrap_or_default(),
            party_size = response.guests.len(),
            first_response = options.require_attendance,
            "RSVP saved"
        );

        Ok(updated)
    }
}
