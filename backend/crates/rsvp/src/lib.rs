//! RSVP Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, payload validation, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory repository implementations
//! - `presentation/` - HTTP handlers, admission middleware, router
//!
//! ## Admission Model
//! Every route passes the per-endpoint rate limit first. Mutating routes
//! then require an allowed origin and a registered CSRF token before the
//! payload is sanitized and validated. Nothing reaches the repository
//! unless all of these pass.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::{RateLimitPolicy, RsvpConfig};
pub use error::{RsvpError, RsvpResult};
pub use infra::memory::MemoryInviteRepository;
pub use infra::postgres::PgInviteRepository;
pub use presentation::handlers::RsvpAppState;
pub use presentation::router::rsvp_router;

pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
