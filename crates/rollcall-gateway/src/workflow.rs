//! Workflow-automation webhook backend
//!
//! Talks to three webhook paths under one base URL:
//!
//! | Path | Method | Reply |
//! |------|--------|-------|
//! | `/raja-attendance` | POST JSON event | `{success?, message?, data?}`; 409 on duplicate |
//! | `/raja-students` | GET | `{data: {Employee, Student}}` |
//! | `/raja-data?type=news` | GET | `{data: {news: [...]}}` |
//!
//! A reply whose `message` is `"Workflow was started"` means the workflow
//! ran asynchronously and has no result to give. For attendance that is a
//! configuration problem; for the roster the workflow may just be warming
//! up, so it is polled again a few times.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use rollcall_core::config::Config;
use rollcall_core::domain::{
    AttendanceEvent, NewsItem, NewsPriority, NewsStatus, RosterSnapshot, DATE_FORMAT,
};
use rollcall_core::ports::{
    BackendFailure, BackendInfo, BackendKind, BackendResult, Delivery, IAttendanceBackend,
};

use crate::client::{Reply, WebhookClient};
use crate::payload::{duplicate_from, AttendancePayload};
use crate::retry::RetryPolicy;
use crate::GatewayError;

/// Reply text of a workflow that was triggered but did not respond
pub const WORKFLOW_STARTED: &str = "Workflow was started";

const ATTENDANCE_PATH: &str = "raja-attendance";
const STUDENTS_PATH: &str = "raja-students";
const DATA_PATH: &str = "raja-data";

// ============================================================================
// Reply types
// ============================================================================

/// Reply to an attendance submission
#[derive(Debug, Deserialize)]
struct SubmitReply {
    success: Option<bool>,
    message: Option<String>,
}

/// Reply carrying a `data` object
#[derive(Debug, Deserialize)]
struct DataReply {
    message: Option<String>,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct NewsData {
    #[serde(default)]
    news: Vec<WorkflowNewsItem>,
}

/// A news entry as the workflow serves it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowNewsItem {
    headline: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    show_image: Option<bool>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default, alias = "date")]
    date_created: Option<String>,
    #[serde(default)]
    active: Option<bool>,
}

impl WorkflowNewsItem {
    fn into_news_item(self, today: NaiveDate) -> NewsItem {
        let image = self.image.filter(|i| !i.trim().is_empty());
        NewsItem {
            show_image: self.show_image.unwrap_or(image.is_some()),
            image,
            priority: self
                .priority
                .as_deref()
                .map(NewsPriority::from_cell)
                .unwrap_or_default(),
            date_created: self
                .date_created
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
                .unwrap_or(today),
            status: match self.active {
                Some(false) => NewsStatus::Inactive,
                _ => NewsStatus::Active,
            },
            headline: self.headline,
            subtitle: self.subtitle,
        }
    }
}

// ============================================================================
// WorkflowWebhookBackend
// ============================================================================

/// [`IAttendanceBackend`] for the workflow-automation webhooks
pub struct WorkflowWebhookBackend {
    client: WebhookClient,
    base_url: String,
    roster_poll_attempts: u32,
    roster_poll_delay: Duration,
}

impl WorkflowWebhookBackend {
    /// Creates a backend rooted at `base_url`
    ///
    /// # Arguments
    /// * `base_url` - Webhook base, e.g. `https://automation.example.org/webhook`
    /// * `policy` - Timeout and retry settings
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: WebhookClient::new(policy)?,
            base_url,
            roster_poll_attempts: 3,
            roster_poll_delay: Duration::from_secs(2),
        })
    }

    /// Builds the backend from the `workflow` and `backend` config sections
    ///
    /// # Errors
    /// Returns [`GatewayError::NotConfigured`] when `workflow.base_url` is missing
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let base_url = config
            .workflow
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GatewayError::NotConfigured("workflow.base_url".to_string()))?;
        Ok(Self::new(base_url, RetryPolicy::from_config(&config.backend))?
            .with_roster_polling(config.backend.roster_poll_attempts, config.backend.roster_poll_delay()))
    }

    /// Sets how often the roster is re-polled while the workflow is starting
    #[must_use]
    pub fn with_roster_polling(mut self, attempts: u32, delay: Duration) -> Self {
        self.roster_poll_attempts = attempts;
        self.roster_poll_delay = delay;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_attendance(&self, payload: &AttendancePayload) -> BackendResult {
        let url = self.endpoint(ATTENDANCE_PATH);
        let reply = match self
            .client
            .execute_with_retry("attendance", |http| http.request(Method::POST, &url).json(payload))
            .await
        {
            Ok(reply) => reply,
            Err(err) => return err.into(),
        };

        if reply.is_conflict() {
            return duplicate_from(&reply);
        }
        Self::interpret_submit(&reply)
    }

    fn interpret_submit(reply: &Reply) -> BackendResult {
        let body: SubmitReply = match reply.json() {
            Ok(body) => body,
            Err(err) => return err.into(),
        };

        if body.message.as_deref() == Some(WORKFLOW_STARTED) {
            warn!("Attendance workflow answered without a result");
            return GatewayError::WorkflowInactive.into();
        }
        if body.success == Some(false) {
            let message = body
                .message
                .unwrap_or_else(|| "workflow reported failure".to_string());
            return GatewayError::InvalidResponse(message).into();
        }

        BackendResult::Accepted {
            delivery: Delivery::Remote,
            message: body.message,
        }
    }

    async fn get_data(&self, label: &str, url: &str) -> Result<DataReply, GatewayError> {
        self.client
            .execute_with_retry(label, |http| http.request(Method::GET, url))
            .await?
            .json()
    }
}

#[async_trait::async_trait]
impl IAttendanceBackend for WorkflowWebhookBackend {
    fn info(&self) -> BackendInfo {
        let policy = self.client.policy();
        BackendInfo {
            kind: BackendKind::Workflow,
            configured: true,
            endpoints: BTreeMap::from([
                ("attendance".to_string(), self.endpoint(ATTENDANCE_PATH)),
                ("students".to_string(), self.endpoint(STUDENTS_PATH)),
                ("data".to_string(), self.endpoint(DATA_PATH)),
            ]),
            timeout_ms: policy.timeout.as_millis() as u64,
            max_attempts: policy.max_attempts,
            retry_delay_ms: policy.delay.as_millis() as u64,
            retry_on_timeout: policy.retry_on_timeout,
        }
    }

    async fn submit_attendance(&self, event: &AttendanceEvent) -> BackendResult {
        debug!(name = %event.person_name(), action = %event.action(), "Posting attendance to workflow");
        self.post_attendance(&AttendancePayload::from_event(event)).await
    }

    async fn fetch_roster(&self) -> Result<RosterSnapshot, BackendFailure> {
        let url = self.endpoint(STUDENTS_PATH);
        let mut polls = 0;

        loop {
            let reply = self.get_data("students", &url).await?;

            if reply.message.as_deref() == Some(WORKFLOW_STARTED) {
                if polls < self.roster_poll_attempts {
                    polls += 1;
                    info!(
                        poll = polls,
                        of = self.roster_poll_attempts,
                        "Roster workflow still starting, polling again in {:?}",
                        self.roster_poll_delay
                    );
                    tokio::time::sleep(self.roster_poll_delay).await;
                    continue;
                }
                return Err(GatewayError::WorkflowInactive.into());
            }

            let data = reply.data.ok_or_else(|| {
                GatewayError::InvalidResponse("roster reply has no data".to_string())
            })?;
            if data.get("Employee").is_none() && data.get("Student").is_none() {
                return Err(GatewayError::InvalidResponse(
                    "roster data has neither Employee nor Student".to_string(),
                )
                .into());
            }

            let roster: RosterSnapshot = serde_json::from_value(data)
                .map_err(|e| GatewayError::InvalidResponse(format!("roster data: {e}")))?;
            info!(count = roster.len(), "Roster fetched from workflow");
            return Ok(roster);
        }
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>, BackendFailure> {
        let url = format!("{}?type=news", self.endpoint(DATA_PATH));
        let reply = self.get_data("news", &url).await?;
        let data = reply
            .data
            .ok_or_else(|| GatewayError::InvalidResponse("news reply has no data".to_string()))?;
        let news: NewsData = serde_json::from_value(data)
            .map_err(|e| GatewayError::InvalidResponse(format!("news data: {e}")))?;

        let today = chrono::Local::now().date_naive();
        Ok(news
            .news
            .into_iter()
            .filter(|item| !item.headline.trim().is_empty())
            .map(|item| item.into_news_item(today))
            .collect())
    }

    async fn update_news(&self, _index: usize, _item: &NewsItem) -> Result<(), BackendFailure> {
        Err(BackendFailure::unsupported("Updating news", BackendKind::Workflow))
    }

    async fn check_connection(&self) -> Result<String, BackendFailure> {
        match self.post_attendance(&AttendancePayload::connection_probe()).await {
            BackendResult::Accepted { message, .. } => Ok(message
                .unwrap_or_else(|| "Workflow webhook connection working".to_string())),
            // The webhook is up and checking records; that is good enough
            BackendResult::RejectedDuplicate { .. } => {
                Ok("Workflow webhook reachable (test record already present)".to_string())
            }
            BackendResult::Failed(failure) => Err(failure),
        }
    }
}
