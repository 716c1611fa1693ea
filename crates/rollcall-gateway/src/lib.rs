//! Rollcall Gateway - HTTP backends for attendance, roster, and news
//!
//! Provides one [`IAttendanceBackend`] implementation per remote service:
//! - Workflow-automation webhook (JSON in, JSON out)
//! - Script webhook (form-encoded attendance only)
//! - Spreadsheet values API (rows in, rows out)
//! - Offline fallback when nothing is configured
//!
//! ## Modules
//!
//! - [`client`] - HTTP client with per-attempt timeout and fixed-delay retry
//! - [`retry`] - Retry policy and failure classification
//! - [`payload`] - Wire shapes shared by the webhook backends
//! - [`workflow`], [`script`], [`sheets`], [`offline`] - Backend adapters
//! - [`factory`] - Backend selection from configuration
//!
//! [`IAttendanceBackend`]: rollcall_core::ports::IAttendanceBackend

pub mod client;
pub mod factory;
pub mod offline;
pub mod payload;
pub mod retry;
pub mod script;
pub mod sheets;
pub mod workflow;

pub use factory::build_backend;
pub use offline::OfflineBackend;
pub use retry::RetryPolicy;
pub use script::ScriptWebhookBackend;
pub use sheets::SheetsBackend;
pub use workflow::WorkflowWebhookBackend;

use std::time::Duration;

use rollcall_core::ports::{BackendFailure, BackendResult, FailureKind};
use thiserror::Error;

/// Errors that can occur when talking to a remote attendance service
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An attempt did not complete within the per-attempt timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// A connection-level error occurred
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The service answered with a non-2xx, non-409 status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// `message` from the error body, or the status reason
        message: String,
    },

    /// The body did not match the backend's documented schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The workflow acknowledged the call but never produced a result
    #[error("Workflow was started but returned no result")]
    WorkflowInactive,

    /// The backend is missing a required setting
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl GatewayError {
    /// Classifies a reqwest error, separating timeouts from other transport failures
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(timeout)
        } else {
            GatewayError::Network(err)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout(_))
    }

    /// Whether another attempt could succeed (ignoring the timeout flag,
    /// which [`RetryPolicy::should_retry`] applies)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout(_) | GatewayError::Network(_) | GatewayError::Status { .. }
        )
    }

    /// Coarse classification used by the session
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            GatewayError::Timeout(_) | GatewayError::Network(_) => FailureKind::Transient,
            GatewayError::Status { .. }
            | GatewayError::InvalidResponse(_)
            | GatewayError::WorkflowInactive => FailureKind::Backend,
            GatewayError::NotConfigured(_) => FailureKind::Configuration,
        }
    }

    /// The message shown to the person at the kiosk
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Timeout(_) => {
                "Request timed out. Please check your internet connection and try again."
                    .to_string()
            }
            GatewayError::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            GatewayError::Status { status: 404, .. } => {
                "Workflow not found. Please check the webhook URL configuration.".to_string()
            }
            GatewayError::Status { status, .. } if *status >= 500 => {
                "Server error. Please try again later or contact support.".to_string()
            }
            GatewayError::Status { status, message } => format!("Error: HTTP {status}: {message}"),
            GatewayError::InvalidResponse(reason) => {
                format!("Unexpected response from the server: {reason}")
            }
            GatewayError::WorkflowInactive => {
                "The attendance workflow needs a configuration fix: it started but sent no result."
                    .to_string()
            }
            GatewayError::NotConfigured(what) => format!("{what} is not configured."),
        }
    }
}

impl From<GatewayError> for BackendFailure {
    fn from(err: GatewayError) -> Self {
        BackendFailure::new(err.failure_kind(), err.user_message())
    }
}

impl From<GatewayError> for BackendResult {
    fn from(err: GatewayError) -> Self {
        BackendResult::Failed(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> GatewayError {
        GatewayError::Status {
            status: code,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_user_messages_by_kind() {
        assert!(GatewayError::Timeout(Duration::from_secs(30))
            .user_message()
            .starts_with("Request timed out"));
        assert!(status(404).user_message().starts_with("Workflow not found"));
        assert!(status(500).user_message().starts_with("Server error"));
        assert!(status(503).user_message().starts_with("Server error"));
        assert_eq!(status(400).user_message(), "Error: HTTP 400: boom");
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            GatewayError::Timeout(Duration::ZERO).failure_kind(),
            FailureKind::Transient
        );
        assert_eq!(status(500).failure_kind(), FailureKind::Backend);
        assert_eq!(
            GatewayError::InvalidResponse("x".into()).failure_kind(),
            FailureKind::Backend
        );
        assert_eq!(
            GatewayError::NotConfigured("x".into()).failure_kind(),
            FailureKind::Configuration
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(status(500).is_retryable());
        assert!(GatewayError::Timeout(Duration::ZERO).is_retryable());
        assert!(GatewayError::Timeout(Duration::ZERO).is_timeout());
        assert!(!GatewayError::InvalidResponse("x".into()).is_retryable());
        assert!(!GatewayError::WorkflowInactive.is_retryable());
    }

    #[test]
    fn test_into_backend_result() {
        let result: BackendResult = status(502).into();
        match result {
            BackendResult::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Backend);
                assert!(failure.reason.starts_with("Server error"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
