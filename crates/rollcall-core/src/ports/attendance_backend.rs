//! Attendance backend port (driven/secondary port)
//!
//! This module defines the interface to the remote services that persist
//! attendance and serve roster and news data. Implementations live in the
//! `rollcall-gateway` crate, one per remote service, plus an offline
//! fallback.
//!
//! ## Design Notes
//!
//! - `submit_attendance` never returns an error: every transport, status,
//!   or shape problem is folded into [`BackendResult::Failed`] at the
//!   adapter boundary, so the session only ever sees three outcomes.
//! - Read operations return [`BackendFailure`] rather than `anyhow::Error`
//!   because callers branch on [`FailureKind`] (e.g. unsupported vs. down).
//! - Uses `#[async_trait]` for async trait methods.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AttendanceEvent, DomainError, ExistingRecord, NewsItem, RosterSnapshot};

// ============================================================================
// BackendKind
// ============================================================================

/// The remote services an attendance backend can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Workflow-automation webhook (n8n style)
    Workflow,
    /// Script-based webhook (Apps Script style)
    Script,
    /// Spreadsheet values API
    Sheets,
    /// No remote service; everything is accepted locally
    Offline,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Workflow => "workflow",
            BackendKind::Script => "script",
            BackendKind::Sheets => "sheets",
            BackendKind::Offline => "offline",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workflow" => Ok(BackendKind::Workflow),
            "script" => Ok(BackendKind::Script),
            "sheets" => Ok(BackendKind::Sheets),
            "offline" => Ok(BackendKind::Offline),
            other => Err(DomainError::ValidationFailed(format!(
                "unknown backend kind '{other}'"
            ))),
        }
    }
}

// ============================================================================
// BackendResult
// ============================================================================

/// Where an accepted event ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// A remote service confirmed the write
    Remote,
    /// No remote service is configured; the event lives only in the session
    Offline,
}

/// Classification of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Timeout or connection-level problem
    Transient,
    /// The service answered with an error status or an unexpected body
    Backend,
    /// The backend is missing settings it needs
    Configuration,
    /// The backend does not offer this operation
    Unsupported,
}

/// A failed remote call, with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}")]
pub struct BackendFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl BackendFailure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn unsupported(operation: &str, backend: BackendKind) -> Self {
        Self::new(
            FailureKind::Unsupported,
            format!("{operation} is not supported by the {backend} backend"),
        )
    }
}

/// Outcome of a remote attempt to log one attendance event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResult {
    /// The event was stored (remotely, or accepted offline)
    Accepted {
        delivery: Delivery,
        message: Option<String>,
    },
    /// The backend already holds a record for this person today
    RejectedDuplicate {
        existing: ExistingRecord,
        message: Option<String>,
    },
    /// All attempts failed
    Failed(BackendFailure),
}

impl BackendResult {
    /// Remote acceptance without a message
    pub fn accepted() -> Self {
        BackendResult::Accepted {
            delivery: Delivery::Remote,
            message: None,
        }
    }

    /// Synthetic acceptance used when no backend is reachable
    pub fn offline() -> Self {
        BackendResult::Accepted {
            delivery: Delivery::Offline,
            message: Some("Attendance recorded (offline mode)".to_string()),
        }
    }

    pub fn failed(kind: FailureKind, reason: impl Into<String>) -> Self {
        BackendResult::Failed(BackendFailure::new(kind, reason))
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, BackendResult::Accepted { .. })
    }
}

// ============================================================================
// BackendInfo
// ============================================================================

/// Static description of a backend, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub kind: BackendKind,
    /// Whether the backend has every setting it needs
    pub configured: bool,
    /// Named endpoints, e.g. `attendance -> https://...`
    pub endpoints: BTreeMap<String, String>,
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub retry_on_timeout: bool,
}

// ============================================================================
// IAttendanceBackend trait
// ============================================================================

/// Port trait for the remote attendance services
///
/// ## Implementation Notes
///
/// - Implementations own request construction, timeouts, and retries.
/// - Each implementation parses exactly one documented response schema;
///   a body that does not match is a [`FailureKind::Backend`] failure.
/// - An HTTP 409 (or equivalent) on submit maps to
///   [`BackendResult::RejectedDuplicate`].
#[async_trait::async_trait]
pub trait IAttendanceBackend: Send + Sync {
    /// Describes the backend and its retry settings
    fn info(&self) -> BackendInfo;

    /// Persists one attendance event
    async fn submit_attendance(&self, event: &AttendanceEvent) -> BackendResult;

    /// Fetches the current roster
    async fn fetch_roster(&self) -> Result<RosterSnapshot, BackendFailure>;

    /// Fetches the news banner items
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, BackendFailure>;

    /// Replaces the news item at `index`
    async fn update_news(&self, index: usize, item: &NewsItem) -> Result<(), BackendFailure>;

    /// Verifies the service is reachable; returns a short status message
    async fn check_connection(&self) -> Result<String, BackendFailure>;
}
