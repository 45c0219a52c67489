//! Domain Entities

use std::collections::HashSet;

use crate::domain::value_objects::{AttendanceStatus, InviteCode};
use kernel::id::{GuestId, InviteId};

/// A person on an invitation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    pub diet_notes: String,
    pub status: AttendanceStatus,
    /// The addressee of the invitation. Exactly one per invite.
    pub is_primary: bool,
}

/// An invitation and its guest party
#[derive(Debug, Clone)]
pub struct Invite {
    pub id: InviteId,
    pub code: InviteCode,
    pub message: String,
    /// Set once the party has answered
    pub responded_at_ms: Option<i64>,
    /// Primary guest first, the rest in stored order
    pub guests: Vec<Guest>,
}

impl Invite {
    /// Fresh, unanswered invite. Every guest starts `UNSELECTED`.
    pub fn create(new_invite: &NewInvite) -> Self {
        let guests = new_invite
            .guests
            .iter()
            .enumerate()
            .map(|(index, g)| Guest {
                id: GuestId::new(),
                name: g.name.clone(),
                diet_notes: g.diet_notes.clone(),
                status: AttendanceStatus::Unselected,
                is_primary: index == 0,
            })
            .collect();

        Self {
            id: InviteId::new(),
            code: new_invite.code.clone(),
            message: String::new(),
            responded_at_ms: None,
            guests,
        }
    }

    pub fn has_responded(&self) -> bool {
        self.responded_at_ms.is_some()
    }

    pub fn primary_guest(&self) -> Option<&Guest> {
        self.guests.iter().find(|g| g.is_primary)
    }

    pub fn guest(&self, id: GuestId) -> Option<&Guest> {
        self.guests.iter().find(|g| g.id == id)
    }

    /// Apply a party response in place.
    ///
    /// `response.guests[0]` always updates the primary guest, whatever id
    /// it carries. Additional guests update the non-primary guest with the
    /// same id, or join the party with a fresh id. Non-primary guests the
    /// response does not mention leave the party, so the stored party is
    /// always exactly the primary plus the response's additional guests.
    pub fn apply_response(&mut self, response: &RsvpResponse, now_ms: i64) {
        let mut mentioned = HashSet::new();
        let mut entries = response.guests.iter();

        if let Some(entry) = entries.next() {
            if let Some(primary) = self.guests.iter_mut().find(|g| g.is_primary) {
                primary.name = entry.name.clone();
                primary.diet_notes = entry.diet_notes.clone();
                primary.status = entry.status;
                mentioned.insert(primary.id);
            }
        }

        for entry in entries {
            let existing = entry.id.and_then(|id| {
                self.guests
                    .iter()
                    .position(|g| g.id == id && !g.is_primary && !mentioned.contains(&g.id))
            });

            match existing {
                Some(index) => {
                    let guest = &mut self.guests[index];
                    guest.name = entry.name.clone();
                    guest.diet_notes = entry.diet_notes.clone();
                    guest.status = entry.status;
                    mentioned.insert(guest.id);
                }
                None => {
                    let guest = Guest {
                        id: GuestId::new(),
                        name: entry.name.clone(),
                        diet_notes: entry.diet_notes.clone(),
                        status: entry.status,
                        is_primary: false,
                    };
                    mentioned.insert(guest.id);
                    self.guests.push(guest);
                }
            }
        }

        self.guests.retain(|g| g.is_primary || mentioned.contains(&g.id));

        self.message = response.message.clone();
        self.responded_at_ms = Some(now_ms);
    }
}

/// Guest details for a new invitation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub name: String,
    pub diet_notes: String,
}

/// A new invitation. The first guest becomes the primary guest.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub code: InviteCode,
    pub guests: Vec<NewGuest>,
}

/// A validated party response, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpResponse {
    pub message: String,
    /// Primary guest first. Additional guests only when the primary attends.
    pub guests: Vec<ResponseGuest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseGuest {
    /// Existing guest to update; `None` adds a guest to the party
    pub id: Option<GuestId>,
    pub name: String,
    pub diet_notes: String,
    pub status: AttendanceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, is_primary: bool) -> Guest {
        Guest {
            id: GuestId::new(),
            name: name.to_string(),
            diet_notes: String::new(),
            status: AttendanceStatus::Unselected,
            is_primary,
        }
    }

    #[test]
    fn test_primary_guest_lookup() {
        let invite = Invite {
            id: InviteId::new(),
            code: InviteCode::new("ABCD").unwrap(),
            message: String::new(),
            responded_at_ms: None,
            guests: vec![guest("Plus One", false), guest("Jane Doe", true)],
        };
        assert_eq!(invite.primary_guest().map(|g| g.name.as_str()), Some("Jane Doe"));
        assert!(!invite.has_responded());

        let other = invite.guests[0].id;
        assert_eq!(invite.guest(other).map(|g| g.name.as_str()), Some("Plus One"));
        assert!(invite.guest(GuestId::new()).is_none());
    }

    fn response_guest(id: Option<GuestId>, name: &str, status: AttendanceStatus) -> ResponseGuest {
        ResponseGuest {
            id,
            name: name.to_string(),
            diet_notes: String::new(),
            status,
        }
    }

    fn party() -> Invite {
        Invite {
            id: InviteId::new(),
            code: InviteCode::new("SMITH").unwrap(),
            message: String::new(),
            responded_at_ms: None,
            guests: vec![guest("Jane Doe", true), guest("John Doe", false)],
        }
    }

    #[test]
    fn test_apply_response_updates_known_guests() {
        let mut invite = party();
        let john = invite.guests[1].id;

        invite.apply_response(
            &RsvpResponse {
                message: "Yay!".to_string(),
                guests: vec![
                    response_guest(None, "Jane Smith", AttendanceStatus::Attending),
                    response_guest(Some(john), "Johnny Doe", AttendanceStatus::Attending),
                ],
            },
            42,
        );

        assert_eq!(invite.responded_at_ms, Some(42));
        assert_eq!(invite.message, "Yay!");
        assert_eq!(invite.guests.len(), 2);
        assert_eq!(invite.guests[0].name, "Jane Smith");
        assert_eq!(invite.guests[0].status, AttendanceStatus::Attending);
        assert_eq!(invite.guest(john).map(|g| g.name.as_str()), Some("Johnny Doe"));
    }

    #[test]
    fn test_apply_response_adds_new_and_drops_unmentioned() {
        let mut invite = party();
        let john = invite.guests[1].id;

        invite.apply_response(
            &RsvpResponse {
                message: String::new(),
                guests: vec![
                    response_guest(None, "Jane Doe", AttendanceStatus::Attending),
                    response_guest(None, "Bob", AttendanceStatus::Attending),
                ],
            },
            1,
        );

        assert_eq!(invite.guests.len(), 2);
        assert!(invite.guest(john).is_none());
        let bob = invite.guests.iter().find(|g| g.name == "Bob").unwrap();
        assert!(!bob.is_primary);
        assert_eq!(bob.status, AttendanceStatus::Attending);
    }

    #[test]
    fn test_apply_response_primary_id_cannot_target_plus_one() {
        let mut invite = party();
        let john = invite.guests[1].id;

        invite.apply_response(
            &RsvpResponse {
                message: String::new(),
                guests: vec![response_guest(Some(john), "Mallory", AttendanceStatus::NotAttending)],
            },
            1,
        );

        assert_eq!(invite.guests.len(), 1);
        assert_eq!(invite.guests[0].name, "Mallory");
        assert!(invite.guests[0].is_primary);
        assert_ne!(invite.guests[0].id, john);
    }

    #[test]
    fn test_resubmitting_without_ids_keeps_party_bounded() {
        let mut invite = party();
        let full_party: Vec<ResponseGuest> = std::iter::once(response_guest(
            None,
            "Jane Doe",
            AttendanceStatus::Attending,
        ))
        .chain((0..19).map(|_| response_guest(None, "Plus One", AttendanceStatus::Attending)))
        .collect();
        let response = RsvpResponse {
            message: String::new(),
            guests: full_party,
        };

        for now_ms in 1..=3 {
            invite.apply_response(&response, now_ms);
            assert_eq!(invite.guests.len(), 20);
        }
        assert_eq!(invite.guests.iter().filter(|g| g.is_primary).count(), 1);
    }

    #[test]
    fn test_declining_clears_plus_ones() {
        let mut invite = party();

        invite.apply_response(
            &RsvpResponse {
                message: String::new(),
                guests: vec![response_guest(None, "Jane Doe", AttendanceStatus::NotAttending)],
            },
            1,
        );

        assert_eq!(invite.guests.len(), 1);
        assert_eq!(invite.guests[0].status, AttendanceStatus::NotAttending);
    }
}
