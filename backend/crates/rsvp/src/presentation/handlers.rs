//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use platform::csrf::CsrfProtector;
use serde_json::Value;

use crate::application::config::RsvpConfig;
use crate::application::create_invite::{CreateInviteInput, CreateInviteUseCase};
use crate::application::get_invite::GetInviteUseCase;
use crate::application::search_guests::SearchGuestsUseCase;
use crate::application::submit_rsvp::SubmitRsvpUseCase;
use crate::domain::repository::InviteRepository;
use crate::error::{RsvpError, RsvpResult};
use crate::presentation::dto::{
    CsrfTokenResponse, InviteQuery, InviteResponse, SearchQuery, SearchResponse, SearchResult,
};

/// Shared state for RSVP handlers
#[derive(Clone)]
pub struct RsvpAppState<R>
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<RsvpConfig>,
    pub csrf: Arc<CsrfProtector>,
}

/// GET /api/csrf
pub async fn issue_csrf_token<R>(State(state): State<RsvpAppState<R>>) -> impl IntoResponse
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    let issued = state.csrf.generate_token();

    (
        [(header::SET_COOKIE, issued.cookie.clone())],
        [(header::CACHE_CONTROL, "no-store")],
        Json(CsrfTokenResponse::from(&issued)),
    )
}

/// GET /api/rsvp?code=
pub async fn get_invite<R>(
    State(state): State<RsvpAppState<R>>,
    Query(query): Query<InviteQuery>,
) -> RsvpResult<Json<InviteResponse>>
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    let use_case = GetInviteUseCase::new(state.repo.clone());
    let invite = use_case.execute(query.code.as_deref()).await?;
    Ok(Json(InviteResponse::from(&invite)))
}

/// POST /api/rsvp
pub async fn submit_rsvp<R>(
    State(state): State<RsvpAppState<R>>,
    body: Result<Json<Value>, JsonRejection>,
) -> RsvpResult<Json<InviteResponse>>
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    let Json(body) = body.map_err(invalid_json)?;

    let use_case = SubmitRsvpUseCase::new(state.repo.clone(), state.config.clone());
    let invite = use_case.execute(&body).await?;

    Ok(Json(InviteResponse::from(&invite)))
}

/// GET /api/guests/search?code=&q=
pub async fn search_guests<R>(
    State(state): State<RsvpAppState<R>>,
    Query(query): Query<SearchQuery>,
) -> RsvpResult<Json<SearchResponse>>
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    let use_case = SearchGuestsUseCase::new(state.repo.clone(), state.config.clone());
    let guests = use_case
        .execute(query.code.as_deref(), query.q.as_deref())
        .await?;

    Ok(Json(SearchResponse {
        results: guests.iter().map(SearchResult::from).collect(),
    }))
}

/// POST /api/admin/invites
pub async fn create_invite<R>(
    State(state): State<RsvpAppState<R>>,
    body: Result<Json<Value>, JsonRejection>,
) -> RsvpResult<impl IntoResponse>
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    let Json(body) = body.map_err(invalid_json)?;

    let use_case = CreateInviteUseCase::new(state.repo.clone(), state.config.clone());
    let invite = use_case.execute(CreateInviteInput::from_json(&body)).await?;

    Ok((StatusCode::CREATED, Json(InviteResponse::from(&invite))))
}

fn invalid_json(rejection: JsonRejection) -> RsvpError {
    tracing::debug!(error = %rejection, "Rejected request body");
    RsvpError::InvalidRequest("Request body must be a JSON object".to_string())
}
