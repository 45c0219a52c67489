//! Get Invite Use Case

use crate::domain::entities::Invite;
use crate::domain::repository::InviteRepository;
use crate::domain::value_objects::{InviteCode, InviteCodeError};
use crate::error::{RsvpError, RsvpResult};
use std::sync::Arc;

/// Parse a client-supplied invite code.
///
/// A missing code is a bad request. A malformed one is reported as not
/// found, same as an unknown code.
pub(crate) fn parse_invite_code(raw: Option<&str>) -> RsvpResult<InviteCode> {
    match InviteCode::new(raw.unwrap_or_default()) {
        Ok(code) => Ok(code),
        Err(InviteCodeError::Empty) => Err(RsvpError::InvalidRequest(
            InviteCodeError::Empty.to_string(),
        )),
        Err(_) => Err(RsvpError::InviteNotFound),
    }
}

pub struct GetInviteUseCase<R>
where
    R: InviteRepository,
{
    repo: Arc<R>,
}

impl<R> GetInviteUseCase<R>
where
    R: InviteRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, code: Option<&str>) -> RsvpResult<Invite> {
        let code = parse_invite_code(code)?;

        let invite = self
            .repo
            .find_by_code(&code)
            .await?
            .ok_or(RsvpError::InviteNotFound)?;

        tracing::debug!(invite_id = %invite.id, "Invite loaded");
        Ok(invite)
    }
}
