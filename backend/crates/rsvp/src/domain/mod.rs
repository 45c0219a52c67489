//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Invite, Guest)
//! - Domain value objects (AttendanceStatus, InviteCode)
//! - Submission sanitization and validation
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod validation;
pub mod value_objects;
