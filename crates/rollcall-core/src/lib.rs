//! Rollcall Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `AttendanceEvent`, `RosterSnapshot`, `NewsBoard`, `AdminGate`
//! - **Duplicate guard** - one attendance record per person per day
//! - **Use cases** - `RecordAttendanceUseCase`, `ManageRosterUseCase`, `NewsUseCase`
//! - **Port definitions** - Traits for adapters: `IAttendanceBackend`, `ISessionHistory`, `IClock`
//! - **Configuration** - YAML config with validation and a builder
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
