//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the request-admission foundations shared by every
//! mutating endpoint:
//! - Input sanitization and display escaping
//! - Fixed-window and sliding-window rate limiting
//! - CSRF token issuance/verification and origin checks
//! - Cookie handling, client identification, randomness
//! - Clock abstraction and periodic sweep tasks for in-memory stores

pub mod client;
pub mod clock;
pub mod cookie;
pub mod crypto;
pub mod csrf;
pub mod origin;
pub mod rate_limit;
pub mod sanitize;
pub mod sweeper;
