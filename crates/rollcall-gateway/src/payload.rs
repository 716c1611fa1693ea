//! Wire shapes shared by the webhook backends

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rollcall_core::domain::{AttendanceEvent, ExistingRecord, OrgUnit, DATE_FORMAT};
use rollcall_core::ports::BackendResult;

use crate::client::Reply;

/// Tag the script backend expects in every submission
pub const SCRIPT_SOURCE: &str = "Web App";

/// One attendance event as posted to a webhook
///
/// `branch` is only present for employees and `grade`/`area` only for
/// students, unless [`AttendancePayload::with_blank_placement`] fills them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendancePayload {
    pub name: String,
    pub category: String,
    pub action: String,
    pub date: String,
    pub time: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub test: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub connection_test: bool,
}

impl AttendancePayload {
    pub fn from_event(event: &AttendanceEvent) -> Self {
        let (branch, grade, area) = match event.org_unit() {
            OrgUnit::Branch { branch } => (Some(branch.clone()), None, None),
            OrgUnit::GradeArea { grade, area } => (None, Some(grade.clone()), Some(area.clone())),
        };

        Self {
            name: event.person_name().to_string(),
            category: event.person_category().to_string(),
            action: event.action().to_string(),
            date: event.occurred_date().format(DATE_FORMAT).to_string(),
            time: event.occurred_time().to_string(),
            timestamp: event
                .created_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            branch,
            grade,
            area,
            reason: event.reason().map(str::to_string),
            source: None,
            test: false,
            connection_test: false,
        }
    }

    /// A flagged record used to probe the workflow webhook
    pub fn connection_probe() -> Self {
        let now = chrono::Local::now();
        Self {
            name: "Connection Test".to_string(),
            category: "Student".to_string(),
            action: "present".to_string(),
            date: now.format(DATE_FORMAT).to_string(),
            time: now.format("%H:%M:%S").to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            branch: None,
            grade: Some("Test Grade".to_string()),
            area: Some("Test Area".to_string()),
            reason: None,
            source: None,
            test: true,
            connection_test: true,
        }
    }

    /// Sends every placement field, empty when it does not apply, and
    /// stamps the submission source
    #[must_use]
    pub fn with_blank_placement(mut self, source: &str) -> Self {
        self.branch.get_or_insert_with(String::new);
        self.grade.get_or_insert_with(String::new);
        self.area.get_or_insert_with(String::new);
        self.reason.get_or_insert_with(String::new);
        self.source = Some(source.to_string());
        // Webhook generates its own submission timestamp
        self.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self
    }
}

/// Body of a 409 reply
///
/// `existingRecord` is kept loose so one oddly typed field does not cost
/// the rest of the record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateBody {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    existing_record: Option<Value>,
}

/// Scalar JSON value as text; objects, arrays and nulls are dropped
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn existing_from(record: Option<&Value>) -> ExistingRecord {
    let field = |key: &str| scalar_text(record.and_then(|r| r.get(key)));
    ExistingRecord {
        name: field("name"),
        date: field("date"),
        action: field("action"),
        time: field("time"),
    }
}

/// Turns a 409 reply into a duplicate rejection
///
/// The body is optional; an unreadable one still counts as a duplicate.
pub fn duplicate_from(reply: &Reply) -> BackendResult {
    let body: DuplicateBody = serde_json::from_str(&reply.body).unwrap_or_default();
    BackendResult::RejectedDuplicate {
        existing: existing_from(body.existing_record.as_ref()),
        message: scalar_text(body.message.as_ref()),
    }
}
