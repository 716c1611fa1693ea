//! Domain entities and business logic
//!
//! This module contains the core domain types for Rollcall:
//! - Newtypes for validated identifiers and names
//! - Attendance events and the selections they are built from
//! - The duplicate guard enforcing one record per person per day
//! - Roster and news banner types
//! - The admin gate
//! - Domain-specific error types

pub mod admin;
pub mod attendance;
pub mod errors;
pub mod guard;
pub mod news;
pub mod newtypes;
pub mod roster;

// Re-export commonly used types
pub use admin::{AdminGate, AdminSession};
pub use attendance::{
    AttendanceAction, AttendanceEvent, ExistingRecord, OrgUnit, PersonCategory, DATE_FORMAT,
    TIME_FORMAT,
};
pub use errors::DomainError;
pub use guard::{Admission, DuplicateGuard};
pub use news::{NewsBoard, NewsItem, NewsPriority, NewsStatus};
pub use newtypes::*;
pub use roster::{RosterEntry, RosterSnapshot, DEFAULT_GROUP};
