//! Shared test helpers for gateway integration tests

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use wiremock::MockServer;

use rollcall_core::domain::{AttendanceAction, AttendanceEvent, OrgUnit, PersonCategory, PersonName};
use rollcall_gateway::{RetryPolicy, WorkflowWebhookBackend};

/// Short timeouts and delays so failure paths finish quickly
pub fn fast_policy(retry_on_timeout: bool) -> RetryPolicy {
    RetryPolicy {
        timeout: Duration::from_millis(200),
        max_attempts: 3,
        delay: Duration::from_millis(10),
        retry_on_timeout,
    }
}

/// Alice logging in at the Main branch, 2026-03-02 08:00
pub fn employee_login() -> AttendanceEvent {
    AttendanceEvent::new(
        PersonName::new("Alice").unwrap(),
        PersonCategory::Employee,
        OrgUnit::branch("Main"),
        AttendanceAction::Login,
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap(),
    )
    .unwrap()
}

/// Bob marked absent in Grade 1 / North with a reason
pub fn student_absent() -> AttendanceEvent {
    AttendanceEvent::new(
        PersonName::new("Bob").unwrap(),
        PersonCategory::Student,
        OrgUnit::grade_area("Grade 1", "North"),
        AttendanceAction::Absent,
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 2, 2, 30, 0).unwrap(),
    )
    .unwrap()
    .with_reason("Sick")
}

/// Starts a mock server and a workflow backend pointing at it
pub async fn setup_workflow(policy: RetryPolicy) -> (MockServer, WorkflowWebhookBackend) {
    let server = MockServer::start().await;
    let backend = WorkflowWebhookBackend::new(server.uri(), policy)
        .unwrap()
        .with_roster_polling(3, Duration::from_millis(10));
    (server, backend)
}

/// Number of requests the server has seen so far
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}
