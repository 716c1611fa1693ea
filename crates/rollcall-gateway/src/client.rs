//! HTTP client shared by the remote backends
//!
//! Wraps `reqwest::Client` with the [`RetryPolicy`]: per-attempt timeout,
//! fixed delay between attempts, and status classification. A 409 is not
//! an error here; it is handed back as a [`Reply`] so the backend can read
//! the duplicate record from the body.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reqwest::Method;
//! use rollcall_gateway::client::WebhookClient;
//! use rollcall_gateway::RetryPolicy;
//!
//! # async fn example() -> Result<(), rollcall_gateway::GatewayError> {
//! let client = WebhookClient::new(RetryPolicy::default())?;
//! let reply = client
//!     .execute_with_retry("roster", |http| {
//!         http.request(Method::GET, "https://automation.example.org/webhook/raja-students")
//!     })
//!     .await?;
//! println!("{}", reply.body);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;
use crate::GatewayError;

/// A response that ended the retry loop: 2xx or 409
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }

    /// Parses the body as JSON
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidResponse`] when the body does not match `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_str(&self.body)
            .map_err(|e| GatewayError::InvalidResponse(format!("{e} in body {:?}", truncate(&self.body))))
    }
}

/// Error bodies often carry a `message`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the attendance services
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    policy: RetryPolicy,
}

impl WebhookClient {
    /// Creates a client applying `policy` to every request
    ///
    /// # Errors
    /// Returns [`GatewayError::Network`] if the TLS backend cannot be initialised
    pub fn new(policy: RetryPolicy) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("rollcall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GatewayError::Network)?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends the request produced by `build` until it succeeds, hits a 409,
    /// or the policy gives up.
    ///
    /// `build` is called once per attempt so each attempt gets a fresh body.
    ///
    /// # Arguments
    /// * `label` - Short operation name for logs (e.g. "attendance")
    /// * `build` - Produces the request from the underlying client
    ///
    /// # Errors
    /// The error from the last attempt
    pub async fn execute_with_retry<F>(&self, label: &str, build: F) -> Result<Reply, GatewayError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            match self.attempt(&build).await {
                Ok(reply) => {
                    if attempt > 1 {
                        info!(label, attempt, "Request succeeded after retry");
                    }
                    return Ok(reply);
                }
                Err(err) if self.policy.should_retry(attempt, &err) => {
                    warn!(
                        label,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %err,
                        "Request failed, retrying in {:?}",
                        self.policy.delay
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(label, attempt, error = %err, "Request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt<F>(&self, build: &F) -> Result<Reply, GatewayError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let timeout = self.policy.timeout;
        let response = build(&self.client)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, timeout))?;
        debug!(status = status.as_u16(), bytes = body.len(), "Received response");

        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(Reply { status, body });
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(120) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
