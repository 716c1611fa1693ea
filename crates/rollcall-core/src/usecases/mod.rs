//! Use cases (interactors) for Rollcall
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`RecordAttendanceUseCase`] - Guarded attendance submission and today's log
//! - [`ManageRosterUseCase`] - Roster loading, cascade lookups, admin edits
//! - [`NewsUseCase`] - News banner rotation, editing, publishing

pub mod manage_roster;
pub mod news;
pub mod record_attendance;

pub use manage_roster::ManageRosterUseCase;
pub use news::{NewsEdit, NewsUseCase, PublishOutcome};
pub use record_attendance::{
    AttendanceOutcome, AttendanceRequest, DuplicateSource, RecordAttendanceUseCase,
};
