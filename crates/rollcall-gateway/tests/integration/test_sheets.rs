//! Integration tests for the spreadsheet values API backend

use chrono::NaiveDate;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rollcall_core::domain::{NewsItem, OrgUnit};
use rollcall_core::ports::{FailureKind, IAttendanceBackend};
use rollcall_gateway::SheetsBackend;

use crate::common;

const SHEET: &str = "/spreadsheets/sheet-1/values";

async fn setup_sheets() -> (MockServer, SheetsBackend) {
    let server = MockServer::start().await;
    let backend = SheetsBackend::new(
        format!("{}/spreadsheets", server.uri()),
        "sheet-1",
        common::fast_policy(false),
    )
    .unwrap()
    .with_api_key("test-key")
    .with_access_token("test-token");
    (server, backend)
}

#[tokio::test]
async fn test_roster_reads_names_range() {
    let (server, backend) = setup_sheets().await;

    Mock::given(method("GET"))
        .and(path(format!("{SHEET}/Names!A2:H")))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Names!A2:H100",
            "values": [
                ["Alice", "Employee", "Main"],
                ["Bob", "student", "", "Grade 1", "North"],
                ["Eve", "Employee", "Main", "", "", "", "", "inactive"],
                ["", "Employee", "Main"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roster = backend.fetch_roster().await.unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster.names(&OrgUnit::branch("Main")), ["Alice"]);
    assert_eq!(roster.names(&OrgUnit::grade_area("Grade 1", "North")), ["Bob"]);
}

#[tokio::test]
async fn test_empty_news_range() {
    let (server, backend) = setup_sheets().await;

    Mock::given(method("GET"))
        .and(path(format!("{SHEET}/News!A2:G")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "range": "News!A2:G" })))
        .mount(&server)
        .await;

    assert!(backend.fetch_news().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_appends_attendance_row() {
    let (server, backend) = setup_sheets().await;

    Mock::given(method("POST"))
        .and(path(format!("{SHEET}/Attendance!A:K:append")))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updates": {} })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(backend
        .submit_attendance(&common::student_absent())
        .await
        .is_accepted());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(
        body["values"][0],
        json!([
            "2026-03-02T02:30:00.000Z",
            "2026-03-02",
            "09:30",
            "Bob",
            "Student",
            "absent",
            "",
            "Grade 1",
            "North",
            "Sick",
            "Web App"
        ])
    );
}

#[tokio::test]
async fn test_update_news_writes_row_after_header() {
    let (server, backend) = setup_sheets().await;

    Mock::given(method("PUT"))
        .and(path(format!("{SHEET}/News!A3:G3")))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updatedRows": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut item = NewsItem::new(
        "Exams",
        "Next week",
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
    );
    item.show_image = true;
    item.image = Some("https://img.example.org/exams.png".to_string());

    backend.update_news(1, &item).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(
        body["values"][0],
        json!([
            "Exams",
            "Next week",
            "https://img.example.org/exams.png",
            "TRUE",
            "Medium",
            "2026-02-20",
            "Active"
        ])
    );
}

#[tokio::test]
async fn test_forbidden_write_is_backend_failure() {
    let (server, backend) = setup_sheets().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let item = NewsItem::new("Exams", "", NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
    let failure = backend.update_news(0, &item).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Backend);
    assert_eq!(failure.reason, "Error: HTTP 403: Forbidden");
}

#[tokio::test]
async fn test_connection_check_reads_header_row() {
    let (server, backend) = setup_sheets().await;

    Mock::given(method("GET"))
        .and(path(format!("{SHEET}/Attendance!A1:K1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["Timestamp", "Date", "Time", "Name", "Category", "Action",
                        "Branch", "Grade", "Area", "Reason", "Source"]]
        })))
        .mount(&server)
        .await;

    let message = backend.check_connection().await.unwrap();
    assert!(message.starts_with("Spreadsheet reachable (11 attendance columns)"));
}
