//! Retry policy for remote calls
//!
//! Every logical request gets up to `max_attempts` attempts, each bounded by
//! `timeout`, with a fixed `delay` between attempts and none before the
//! first. Timeouts are not retried unless `retry_on_timeout` is set: a
//! service that is slow to answer has often already accepted the write.

use std::time::Duration;

use rollcall_core::config::BackendConfig;

use crate::GatewayError;

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Timeout and retry settings applied by [`crate::client::WebhookClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub delay: Duration,
    pub retry_on_timeout: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            retry_on_timeout: false,
        }
    }
}

impl RetryPolicy {
    /// Reads the policy from the `backend` config section
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
            retry_on_timeout: config.retry_on_timeout,
        }
    }

    /// A policy that makes exactly one attempt
    pub fn single_attempt(timeout: Duration) -> Self {
        Self {
            timeout,
            max_attempts: 1,
            delay: Duration::ZERO,
            retry_on_timeout: false,
        }
    }

    /// Whether a failed attempt number `attempt` (1-based) should be followed
    /// by another one
    pub fn should_retry(&self, attempt: u32, err: &GatewayError) -> bool {
        if attempt >= self.max_attempts || !err.is_retryable() {
            return false;
        }
        !err.is_timeout() || self.retry_on_timeout
    }
}
