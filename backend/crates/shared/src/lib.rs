//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! RSVP service crates:
//! - The unified error type, error kinds and result alias
//! - Non-leaking public messages for unexpected failures
//! - Typed ID wrappers for invites and guests
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
