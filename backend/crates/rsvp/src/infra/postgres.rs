//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::{GuestId, InviteId};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::entities::{Guest, Invite, NewInvite, RsvpResponse};
use crate::domain::repository::InviteRepository;
use crate::domain::value_objects::{AttendanceStatus, InviteCode};
use crate::error::{RsvpError, RsvpResult};

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl InviteRepository for PgInviteRepository {
    async fn find_by_code(&self, code: &InviteCode) -> RsvpResult<Option<Invite>> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT invite_id, invite_code, message, responded_at
            FROM invites
            WHERE invite_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let guests = fetch_guests(&self.pool, row.invite_id).await?;
                Ok(Some(row.into_invite(guests)))
            }
            None => Ok(None),
        }
    }

    async fn save_response(
        &self,
        invite_id: InviteId,
        response: &RsvpResponse,
    ) -> RsvpResult<Invite> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent submissions for the same invite
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT invite_id, invite_code, message, responded_at
            FROM invites
            WHERE invite_id = $1
            FOR UPDATE
            "#,
        )
        .bind(invite_id.into_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RsvpError::InviteNotFound)?;

        let guests = fetch_guests(&mut *tx, row.invite_id).await?;
        let mut invite = row.into_invite(guests);

        let now = Utc::now();
        invite.apply_response(response, now.timestamp_millis());

        for (position, guest) in invite.guests.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO guests (
                    guest_id,
                    invite_id,
                    guest_name,
                    diet_notes,
                    status,
                    is_primary,
                    position
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (guest_id) DO UPDATE SET
                    guest_name = EXCLUDED.guest_name,
                    diet_notes = EXCLUDED.diet_notes,
                    status = EXCLUDED.status,
                    position = EXCLUDED.position
                "#,
            )
            .bind(guest.id.into_uuid())
            .bind(invite.id.into_uuid())
            .bind(&guest.name)
            .bind(&guest.diet_notes)
            .bind(guest.status.code())
            .bind(guest.is_primary)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        let kept: Vec<Uuid> = invite.guests.iter().map(|g| g.id.into_uuid()).collect();
        let removed = sqlx::query(
            "DELETE FROM guests WHERE invite_id = $1 AND NOT is_primary AND guest_id <> ALL($2)",
        )
        .bind(invite.id.into_uuid())
        .bind(&kept)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("UPDATE invites SET message = $2, responded_at = $3 WHERE invite_id = $1")
            .bind(invite.id.into_uuid())
            .bind(&invite.message)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            invite_id = %invite.id,
            guests = invite.guests.len(),
            removed,
            "Response stored"
        );
        Ok(invite)
    }

    async fn search_guests(
        &self,
        code: &InviteCode,
        query: &str,
        limit: usize,
    ) -> RsvpResult<Vec<Guest>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query_as::<_, GuestRow>(
            r#"
            SELECT g.guest_id, g.guest_name, g.diet_notes, g.status, g.is_primary
            FROM guests g
            JOIN invites i ON i.invite_id = g.invite_id
            WHERE i.invite_code = $1 AND g.guest_name ILIKE $2 ESCAPE '\'
            ORDER BY g.is_primary DESC, g.position
            LIMIT $3
            "#,
        )
        .bind(code.as_str())
        .bind(pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GuestRow::into_guest).collect()
    }

    async fn create_invite(&self, new_invite: &NewInvite) -> RsvpResult<Invite> {
        let invite = Invite::create(new_invite);
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO invites (invite_id, invite_code) VALUES ($1, $2)")
            .bind(invite.id.into_uuid())
            .bind(invite.code.as_str())
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(RsvpError::InviteCodeTaken);
            }
            Err(e) => return Err(e.into()),
        }

        for (position, guest) in invite.guests.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO guests (
                    guest_id,
                    invite_id,
                    guest_name,
                    diet_notes,
                    status,
                    is_primary,
                    position
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(guest.id.into_uuid())
            .bind(invite.id.into_uuid())
            .bind(&guest.name)
            .bind(&guest.diet_notes)
            .bind(guest.status.code())
            .bind(guest.is_primary)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(invite_id = %invite.id, code = %invite.code, "Invite stored");
        Ok(invite)
    }
}

async fn fetch_guests<'e, E>(executor: E, invite_id: Uuid) -> RsvpResult<Vec<Guest>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, GuestRow>(
        r#"
        SELECT guest_id, guest_name, diet_notes, status, is_primary
        FROM guests
        WHERE invite_id = $1
        ORDER BY is_primary DESC, position
        "#,
    )
    .bind(invite_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(GuestRow::into_guest).collect()
}

/// Escape `%`, `_` and `\` for a LIKE pattern with `ESCAPE '\'`
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct InviteRow {
    invite_id: Uuid,
    invite_code: String,
    message: String,
    responded_at: Option<DateTime<Utc>>,
}

impl InviteRow {
    fn into_invite(self, guests: Vec<Guest>) -> Invite {
        Invite {
            id: InviteId::from_uuid(self.invite_id),
            code: InviteCode::from_db(self.invite_code),
            message: self.message,
            responded_at_ms: self.responded_at.map(|t| t.timestamp_millis()),
            guests,
        }
    }
}

#[derive(sqlx::FromRow)]
struct GuestRow {
    guest_id: Uuid,
    guest_name: String,
    diet_notes: String,
    status: String,
    is_primary: bool,
}

impl GuestRow {
    fn into_guest(self) -> RsvpResult<Guest> {
        let status = AttendanceStatus::from_code(&self.status).ok_or_else(|| {
            RsvpError::Internal(format!("unknown guest status in database: {}", self.status))
        })?;

        Ok(Guest {
            id: GuestId::from_uuid(self.guest_id),
            name: self.guest_name,
            diet_notes: self.diet_notes,
            status,
            is_primary: self.is_primary,
        })
    }
}
