//! Script webhook backend
//!
//! Posts attendance as a single form field `data=<json>` to a deployed
//! script URL. Any 2xx counts as stored; the body is not inspected. The
//! script serves neither roster nor news.

use std::collections::BTreeMap;

use reqwest::Method;
use tracing::debug;

use rollcall_core::config::Config;
use rollcall_core::domain::{AttendanceEvent, NewsItem, RosterSnapshot};
use rollcall_core::ports::{
    BackendFailure, BackendInfo, BackendKind, BackendResult, IAttendanceBackend,
};

use crate::client::WebhookClient;
use crate::payload::{duplicate_from, AttendancePayload, SCRIPT_SOURCE};
use crate::retry::RetryPolicy;
use crate::GatewayError;

/// [`IAttendanceBackend`] for a form-encoded script webhook
pub struct ScriptWebhookBackend {
    client: WebhookClient,
    url: String,
}

impl ScriptWebhookBackend {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, policy: RetryPolicy) -> Result<Self, GatewayError> {
        Ok(Self {
            client: WebhookClient::new(policy)?,
            url: url.into(),
        })
    }

    /// # Errors
    /// Returns [`GatewayError::NotConfigured`] when `script.url` is missing
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let url = config
            .script
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GatewayError::NotConfigured("script.url".to_string()))?;
        Self::new(url, RetryPolicy::from_config(&config.backend))
    }
}

#[async_trait::async_trait]
impl IAttendanceBackend for ScriptWebhookBackend {
    fn info(&self) -> BackendInfo {
        let policy = self.client.policy();
        BackendInfo {
            kind: BackendKind::Script,
            configured: true,
            endpoints: BTreeMap::from([("attendance".to_string(), self.url.clone())]),
            timeout_ms: policy.timeout.as_millis() as u64,
            max_attempts: policy.max_attempts,
            retry_delay_ms: policy.delay.as_millis() as u64,
            retry_on_timeout: policy.retry_on_timeout,
        }
    }

    async fn submit_attendance(&self, event: &AttendanceEvent) -> BackendResult {
        let payload = AttendancePayload::from_event(event).with_blank_placement(SCRIPT_SOURCE);
        let data = match serde_json::to_string(&payload) {
            Ok(data) => data,
            Err(e) => return GatewayError::InvalidResponse(format!("encoding payload: {e}")).into(),
        };
        debug!(name = %event.person_name(), "Posting attendance form to script");

        match self
            .client
            .execute_with_retry("attendance", |http| {
                http.request(Method::POST, &self.url).form(&[("data", data.as_str())])
            })
            .await
        {
            Ok(reply) if reply.is_conflict() => duplicate_from(&reply),
            Ok(_) => BackendResult::accepted(),
            Err(err) => err.into(),
        }
    }

    async fn fetch_roster(&self) -> Result<RosterSnapshot, BackendFailure> {
        Err(BackendFailure::unsupported("Loading the roster", BackendKind::Script))
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>, BackendFailure> {
        Err(BackendFailure::unsupported("Loading news", BackendKind::Script))
    }

    async fn update_news(&self, _index: usize, _item: &NewsItem) -> Result<(), BackendFailure> {
        Err(BackendFailure::unsupported("Updating news", BackendKind::Script))
    }

    async fn check_connection(&self) -> Result<String, BackendFailure> {
        self.client
            .execute_with_retry("connection check", |http| http.request(Method::GET, &self.url))
            .await?;
        Ok("Script webhook reachable".to_string())
    }
}
