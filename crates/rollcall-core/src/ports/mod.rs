//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates or, for
//! the in-process ones, right next to the trait.
//!
//! ## Ports Overview
//!
//! - [`IAttendanceBackend`] - Remote attendance, roster, and news services
//! - [`ISessionHistory`] - The in-session log of accepted events
//! - [`IClock`] - Local wall-clock time

pub mod attendance_backend;
pub mod clock;
pub mod session_history;

pub use attendance_backend::{
    BackendFailure, BackendInfo, BackendKind, BackendResult, Delivery, FailureKind,
    IAttendanceBackend,
};
pub use clock::{FixedClock, IClock, SystemClock};
pub use session_history::{ISessionHistory, InMemorySessionHistory};
