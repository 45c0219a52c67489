//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use crate::domain::entities::{Guest, Invite, NewInvite, RsvpResponse};
use crate::domain::value_objects::InviteCode;
use crate::error::RsvpResult;
use kernel::id::InviteId;

/// Invite repository trait
#[trait_variant::make(InviteRepository: Send)]
pub trait LocalInviteRepository {
    /// Load an invite and its guests
    async fn find_by_code(&self, code: &InviteCode) -> RsvpResult<Option<Invite>>;

    /// Apply a party response and mark the invite as answered.
    ///
    /// - the primary guest takes `response.guests[0]`
    /// - additional guests with a known id are updated, the rest are added
    /// - non-primary guests not mentioned are removed
    async fn save_response(&self, invite_id: InviteId, response: &RsvpResponse)
    -> RsvpResult<Invite>;

    /// Guests of the invite whose name contains `query` (case-insensitive)
    async fn search_guests(
        &self,
        code: &InviteCode,
        query: &str,
        limit: usize,
    ) -> RsvpResult<Vec<Guest>>;

    /// Insert an invite with its guests.
    /// Fails with `InviteCodeTaken` if the code exists.
    async fn create_invite(&self, invite: &NewInvite) -> RsvpResult<Invite>;
}
