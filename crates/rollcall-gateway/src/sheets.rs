//! Spreadsheet values API backend
//!
//! Reads and writes plain cell ranges of a single spreadsheet:
//!
//! | Range | Use | Row layout |
//! |-------|-----|------------|
//! | `Names!A2:H` | roster | `[name, category, branch, grade, area, _, _, status]` |
//! | `News!A2:G` | news | `[headline, subtitle, image, show_image, priority, date_created, status]` |
//! | `Attendance!A:K` | attendance (append) | see [`attendance_row`] |
//!
//! Reads authenticate with the API key; writes need a bearer token.

use std::collections::BTreeMap;

use chrono::{NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rollcall_core::config::Config;
use rollcall_core::domain::{
    AttendanceEvent, NewsItem, NewsPriority, NewsStatus, OrgUnit, PersonCategory, PersonName,
    RosterEntry, RosterSnapshot, DATE_FORMAT, DEFAULT_GROUP,
};
use rollcall_core::ports::{
    BackendFailure, BackendInfo, BackendKind, BackendResult, IAttendanceBackend,
};

use crate::client::WebhookClient;
use crate::payload::{duplicate_from, SCRIPT_SOURCE};
use crate::retry::RetryPolicy;
use crate::GatewayError;

const ROSTER_RANGE: &str = "Names!A2:H";
const NEWS_RANGE: &str = "News!A2:G";
const ATTENDANCE_RANGE: &str = "Attendance!A:K";
const HEADER_RANGE: &str = "Attendance!A1:K1";
const VALUE_INPUT: (&str, &str) = ("valueInputOption", "USER_ENTERED");

/// `values` payload of the API, both directions
#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

// ============================================================================
// Row mapping
// ============================================================================

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|c| c.trim()).unwrap_or("")
}

fn or_default_group(value: &str) -> &str {
    if value.is_empty() {
        DEFAULT_GROUP
    } else {
        value
    }
}

/// Builds the roster from `Names` rows
///
/// Rows without a name or a recognised category are skipped, as are rows
/// whose status is `inactive`. Blank placements fall into `General`.
pub fn parse_roster_rows(rows: &[Vec<String>]) -> RosterSnapshot {
    let mut roster = RosterSnapshot::new();

    for (index, row) in rows.iter().enumerate() {
        let sheet_row = index + 2;
        let (name, category) = (cell(row, 0), cell(row, 1));
        if name.is_empty() || category.is_empty() {
            debug!(row = sheet_row, "Skipping roster row: missing name or category");
            continue;
        }
        if cell(row, 7).eq_ignore_ascii_case("inactive") {
            debug!(row = sheet_row, name, "Skipping inactive roster row");
            continue;
        }

        let Ok(category) = category.parse::<PersonCategory>() else {
            debug!(row = sheet_row, category, "Skipping roster row: unknown category");
            continue;
        };
        let Ok(person) = PersonName::new(name) else {
            debug!(row = sheet_row, "Skipping roster row: invalid name");
            continue;
        };

        let org_unit = match category {
            PersonCategory::Employee => OrgUnit::branch(or_default_group(cell(row, 2))),
            PersonCategory::Student => OrgUnit::grade_area(
                or_default_group(cell(row, 3)),
                or_default_group(cell(row, 4)),
            ),
        };

        if let Err(e) = roster.insert(RosterEntry::new(person, org_unit)) {
            debug!(row = sheet_row, error = %e, "Skipping duplicate roster row");
        }
    }

    roster
}

/// Builds news items from `News` rows, skipping rows without a headline
pub fn parse_news_rows(rows: &[Vec<String>], today: NaiveDate) -> Vec<NewsItem> {
    rows.iter()
        .filter(|row| !cell(row, 0).is_empty())
        .map(|row| {
            let image = cell(row, 2);
            NewsItem {
                headline: cell(row, 0).to_string(),
                subtitle: cell(row, 1).to_string(),
                image: (!image.is_empty()).then(|| image.to_string()),
                show_image: cell(row, 3).eq_ignore_ascii_case("true"),
                priority: NewsPriority::from_cell(cell(row, 4)),
                date_created: NaiveDate::parse_from_str(cell(row, 5), DATE_FORMAT)
                    .unwrap_or(today),
                status: NewsStatus::from_cell(cell(row, 6)),
            }
        })
        .collect()
}

/// The `News` row written for `item`
pub fn news_row(item: &NewsItem) -> Vec<String> {
    vec![
        item.headline.clone(),
        item.subtitle.clone(),
        item.image.clone().unwrap_or_default(),
        if item.show_image { "TRUE" } else { "FALSE" }.to_string(),
        item.priority.as_str().to_string(),
        item.date_created.format(DATE_FORMAT).to_string(),
        item.status.as_str().to_string(),
    ]
}

/// The `Attendance` row appended for `event`:
/// `[timestamp, date, time, name, category, action, branch, grade, area, reason, source]`
pub fn attendance_row(event: &AttendanceEvent) -> Vec<String> {
    let org = event.org_unit();
    vec![
        event
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        event.occurred_date().format(DATE_FORMAT).to_string(),
        event.occurred_time().to_string(),
        event.person_name().to_string(),
        event.person_category().to_string(),
        event.action().to_string(),
        org.branch_name().unwrap_or("").to_string(),
        org.grade().unwrap_or("").to_string(),
        org.area().unwrap_or("").to_string(),
        event.reason().unwrap_or("").to_string(),
        SCRIPT_SOURCE.to_string(),
    ]
}

// ============================================================================
// SheetsBackend
// ============================================================================

/// [`IAttendanceBackend`] over the spreadsheet values API
pub struct SheetsBackend {
    client: WebhookClient,
    base_url: String,
    sheet_id: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl SheetsBackend {
    /// Creates a backend for one spreadsheet
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://sheets.googleapis.com/v4/spreadsheets`
    /// * `sheet_id` - Spreadsheet ID
    /// * `policy` - Timeout and retry settings
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        base_url: impl Into<String>,
        sheet_id: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: WebhookClient::new(policy)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sheet_id: sheet_id.into(),
            api_key: None,
            access_token: None,
        })
    }

    /// # Errors
    /// Returns [`GatewayError::NotConfigured`] when the sheet ID or both
    /// credentials are missing
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        if !config.is_complete(BackendKind::Sheets) {
            return Err(GatewayError::NotConfigured(
                "sheets.sheet_id with sheets.api_key or sheets.access_token".to_string(),
            ));
        }
        let sheets = &config.sheets;
        let mut backend = Self::new(
            sheets.base_url.as_str(),
            sheets.sheet_id.as_deref().unwrap_or_default(),
            RetryPolicy::from_config(&config.backend),
        )?;
        backend.api_key = sheets.api_key.clone().filter(|k| !k.trim().is_empty());
        backend.access_token = sheets.access_token.clone().filter(|t| !t.trim().is_empty());
        Ok(backend)
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn range_url(&self, range: &str) -> String {
        format!("{}/{}/values/{}", self.base_url, self.sheet_id, range)
    }

    /// Adds the API key and bearer token, when present
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.api_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        };
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn request(&self, http: &Client, method: Method, url: &str) -> RequestBuilder {
        self.authorize(http.request(method, url))
    }

    async fn read_range(&self, label: &str, range: &str) -> Result<Vec<Vec<String>>, GatewayError> {
        let url = self.range_url(range);
        let values: ValueRange = self
            .client
            .execute_with_retry(label, |http| self.request(http, Method::GET, &url))
            .await?
            .json()?;
        Ok(values.values)
    }
}

#[async_trait::async_trait]
impl IAttendanceBackend for SheetsBackend {
    fn info(&self) -> BackendInfo {
        let policy = self.client.policy();
        BackendInfo {
            kind: BackendKind::Sheets,
            configured: true,
            endpoints: BTreeMap::from([
                ("attendance".to_string(), format!("{}:append", self.range_url(ATTENDANCE_RANGE))),
                ("roster".to_string(), self.range_url(ROSTER_RANGE)),
                ("news".to_string(), self.range_url(NEWS_RANGE)),
            ]),
            timeout_ms: policy.timeout.as_millis() as u64,
            max_attempts: policy.max_attempts,
            retry_delay_ms: policy.delay.as_millis() as u64,
            retry_on_timeout: policy.retry_on_timeout,
        }
    }

    async fn submit_attendance(&self, event: &AttendanceEvent) -> BackendResult {
        let url = format!("{}:append", self.range_url(ATTENDANCE_RANGE));
        let body = ValueRange {
            values: vec![attendance_row(event)],
        };
        debug!(name = %event.person_name(), "Appending attendance row");

        match self
            .client
            .execute_with_retry("attendance", |http| {
                self.request(http, Method::POST, &url)
                    .query(&[VALUE_INPUT])
                    .json(&body)
            })
            .await
        {
            Ok(reply) if reply.is_conflict() => duplicate_from(&reply),
            Ok(_) => BackendResult::accepted(),
            Err(err) => err.into(),
        }
    }

    async fn fetch_roster(&self) -> Result<RosterSnapshot, BackendFailure> {
        let rows = self.read_range("roster", ROSTER_RANGE).await?;
        let roster = parse_roster_rows(&rows);
        info!(rows = rows.len(), count = roster.len(), "Roster fetched from sheet");
        Ok(roster)
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>, BackendFailure> {
        let rows = self.read_range("news", NEWS_RANGE).await?;
        Ok(parse_news_rows(&rows, chrono::Local::now().date_naive()))
    }

    async fn update_news(&self, index: usize, item: &NewsItem) -> Result<(), BackendFailure> {
        // Row 1 holds the headers
        let row = index + 2;
        let url = self.range_url(&format!("News!A{row}:G{row}"));
        let body = ValueRange {
            values: vec![news_row(item)],
        };

        self.client
            .execute_with_retry("news update", |http| {
                self.request(http, Method::PUT, &url)
                    .query(&[VALUE_INPUT])
                    .json(&body)
            })
            .await?;
        info!(row, headline = %item.headline, "News row updated");
        Ok(())
    }

    async fn check_connection(&self) -> Result<String, BackendFailure> {
        let header = self.read_range("connection check", HEADER_RANGE).await?;
        let columns = header.first().map(Vec::len).unwrap_or(0);
        Ok(format!(
            "Spreadsheet reachable ({columns} attendance columns) at {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ))
    }
}
