//! Search Guests Use Case
//!
//! Name autocomplete within one invitation. The invite code gates the
//! search, so a client can only list guests of an invite it knows.

use crate::application::config::RsvpConfig;
use crate::application::get_invite::parse_invite_code;
use crate::domain::entities::Guest;
use crate::domain::repository::InviteRepository;
use crate::error::{RsvpError, RsvpResult};
use platform::sanitize::sanitize_input;
use std::sync::Arc;

pub struct SearchGuestsUseCase<R>
where
    R: InviteRepository,
{
    repo: Arc<R>,
    config: Arc<RsvpConfig>,
}

impl<R> SearchGuestsUseCase<R>
where
    R: InviteRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<RsvpConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, code: Option<&str>, query: Option<&str>) -> RsvpResult<Vec<Guest>> {
        let code = parse_invite_code(code)?;

        let query: String = sanitize_input(query.unwrap_or_default())
            .chars()
            .take(self.config.search_query_max_chars)
            .collect();

        // Unknown codes fail the same way whether or not a query was given
        self.repo
            .find_by_code(&code)
            .await?
            .ok_or(RsvpError::InviteNotFound)?;

        if query.is_empty() {
            return Ok(Vec::new());
        }

        let guests = self
            .repo
            .search_guests(&code, &query, self.config.search_result_limit)
            .await?;

        tracing::debug!(results = guests.len(), "Guest search");
        Ok(guests)
    }
}
