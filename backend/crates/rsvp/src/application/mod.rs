//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Admission (rate limit, origin, CSRF) happens before these run.

pub mod config;
pub mod create_invite;
pub mod get_invite;
pub mod search_guests;
pub mod submit_rsvp;
