//! In-memory Repository
//!
//! Same semantics as the PostgreSQL repository, without a database. Used by
//! router tests and for running the API without `DATABASE_URL`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use kernel::id::InviteId;
use tokio::sync::RwLock;

use crate::domain::entities::{Guest, Invite, NewInvite, RsvpResponse};
use crate::domain::repository::InviteRepository;
use crate::domain::value_objects::InviteCode;
use crate::error::{RsvpError, RsvpResult};

/// Invites keyed by code
#[derive(Clone, Default)]
pub struct MemoryInviteRepository {
    invites: Arc<RwLock<HashMap<InviteCode, Invite>>>,
}

impl MemoryInviteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.invites.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invites.read().await.is_empty()
    }
}

impl InviteRepository for MemoryInviteRepository {
    async fn find_by_code(&self, code: &InviteCode) -> RsvpResult<Option<Invite>> {
        Ok(self.invites.read().await.get(code).cloned())
    }

    async fn save_response(
        &self,
        invite_id: InviteId,
        response: &RsvpResponse,
    ) -> RsvpResult<Invite> {
        let mut invites = self.invites.write().await;
        let invite = invites
            .values_mut()
            .find(|invite| invite.id == invite_id)
            .ok_or(RsvpError::InviteNotFound)?;

        invite.apply_response(response, Utc::now().timestamp_millis());
        Ok(invite.clone())
    }

    async fn search_guests(
        &self,
        code: &InviteCode,
        query: &str,
        limit: usize,
    ) -> RsvpResult<Vec<Guest>> {
        let needle = query.to_lowercase();
        let invites = self.invites.read().await;

        Ok(invites
            .get(code)
            .map(|invite| {
                invite
                    .guests
                    .iter()
                    .filter(|g| g.name.to_lowercase().contains(&needle))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_invite(&self, new_invite: &NewInvite) -> RsvpResult<Invite> {
        let mut invites = self.invites.write().await;
        if invites.contains_key(&new_invite.code) {
            return Err(RsvpError::InviteCodeTaken);
        }

        let invite = Invite::create(new_invite);
        invites.insert(invite.code.clone(), invite.clone());
        Ok(invite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewGuest, ResponseGuest};
    use crate::domain::value_objects::AttendanceStatus;

    fn new_invite(code: &str, names: &[&str]) -> NewInvite {
        NewInvite {
            code: InviteCode::new(code).unwrap(),
            guests: names
                .iter()
                .map(|name| NewGuest {
                    name: name.to_string(),
                    diet_notes: String::new(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryInviteRepository::new();
        let created = repo
            .create_invite(&new_invite("SMITH", &["Jane Doe", "John Doe"]))
            .await
            .unwrap();

        assert!(created.guests[0].is_primary);
        assert!(!created.guests[1].is_primary);
        assert!(created.guests.iter().all(|g| g.status == AttendanceStatus::Unselected));

        let found = repo
            .find_by_code(&InviteCode::new("smith").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let repo = MemoryInviteRepository::new();
        repo.create_invite(&new_invite("SMITH", &["Jane"])).await.unwrap();
        let err = repo
            .create_invite(&new_invite("SMITH", &["Bob"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RsvpError::InviteCodeTaken));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_limited() {
        let repo = MemoryInviteRepository::new();
        repo.create_invite(&new_invite("SMITH", &["Jane Doe", "John Doe", "Bob Roe"]))
            .await
            .unwrap();
        let code = InviteCode::new("SMITH").unwrap();

        let all = repo.search_guests(&code, "DOE", 10).await.unwrap();
        assert_eq!(all.len(), 2);

        let limited = repo.search_guests(&code, "o", 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        let unknown = InviteCode::new("NOPE").unwrap();
        assert!(repo.search_guests(&unknown, "doe", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_response_marks_responded() {
        let repo = MemoryInviteRepository::new();
        let invite = repo.create_invite(&new_invite("SMITH", &["Jane"])).await.unwrap();

        let saved = repo
            .save_response(
                invite.id,
                &RsvpResponse {
                    message: "See you".to_string(),
                    guests: vec![ResponseGuest {
                        id: None,
                        name: "Jane".to_string(),
                        diet_notes: "vegan".to_string(),
                        status: AttendanceStatus::Attending,
                    }],
                },
            )
            .await
            .unwrap();

        assert!(saved.has_responded());
        assert_eq!(saved.guests[0].diet_notes, "vegan");

        let missing = repo
            .save_response(InviteId::new(), &RsvpResponse { message: String::new(), guests: vec![] })
            .await;
        assert!(matches!(missing, Err(RsvpError::InviteNotFound)));
    }
}
