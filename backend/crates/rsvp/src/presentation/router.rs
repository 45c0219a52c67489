//! RSVP Router

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use platform::csrf::CsrfProtector;
use platform::rate_limit::RateLimiter;

use crate::application::config::{Bucket, RsvpConfig};
use crate::domain::repository::InviteRepository;
use crate::presentation::handlers::{self, RsvpAppState};
use crate::presentation::middleware::{CsrfGate, RateLimitGate, enforce_rate_limit, require_csrf};

/// Create the RSVP router for any repository implementation.
///
/// Routes (relative to where it is nested, normally `/api`):
/// - `GET  /csrf`           read bucket
/// - `GET  /rsvp`           read bucket
/// - `POST /rsvp`           submit bucket, origin, CSRF
/// - `GET  /guests/search`  search bucket
/// - `POST /admin/invites`  admin bucket, origin, CSRF
pub fn rsvp_router<R>(
    repo: R,
    config: RsvpConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    csrf: Arc<CsrfProtector>,
) -> Router
where
    R: InviteRepository + Clone + Send + Sync + 'static,
{
    let gate = |bucket: Bucket| RateLimitGate {
        limiter: rate_limiter.clone(),
        bucket,
        config: config.rate_limits.for_bucket(bucket),
    };
    let csrf_gate = CsrfGate {
        csrf: csrf.clone(),
        origin: Arc::new(config.origin.clone()),
    };

    let read = from_fn_with_state(gate(Bucket::Read), enforce_rate_limit);
    let submit = from_fn_with_state(gate(Bucket::Submit), enforce_rate_limit);
    let search = from_fn_with_state(gate(Bucket::Search), enforce_rate_limit);
    let admin = from_fn_with_state(gate(Bucket::Admin), enforce_rate_limit);
    let protected = from_fn_with_state(csrf_gate, require_csrf);

    let state = RsvpAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        csrf,
    };

    Router::new()
        .route(
            "/csrf",
            get(handlers::issue_csrf_token::<R>).layer(read.clone()),
        )
        .route(
            "/rsvp",
            get(handlers::get_invite::<R>).layer(read).merge(
                post(handlers::submit_rsvp::<R>)
                    .layer(protected.clone())
                    .layer(submit),
            ),
        )
        .route(
            "/guests/search",
            get(handlers::search_guests::<R>).layer(search),
        )
        .route(
            "/admin/invites",
            post(handlers::create_invite::<R>)
                .layer(protected)
                .layer(admin),
        )
        .with_state(state)
}
