//! Integration tests for the workflow webhook backend

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use rollcall_core::domain::{NewsPriority, NewsStatus, OrgUnit};
use rollcall_core::ports::{BackendResult, Delivery, FailureKind, IAttendanceBackend};

use crate::common;

#[tokio::test]
async fn test_submit_posts_event_json() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .and(body_partial_json(json!({
            "name": "Alice",
            "category": "Employee",
            "action": "login",
            "date": "2026-03-02",
            "time": "08:00",
            "branch": "Main"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Attendance recorded"
        })))
        .expect(1)
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Accepted { delivery, message } => {
            assert_eq!(delivery, Delivery::Remote);
            assert_eq!(message.as_deref(), Some("Attendance recorded"));
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_student_sends_grade_and_reason() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .and(body_partial_json(json!({
            "name": "Bob",
            "category": "Student",
            "action": "absent",
            "grade": "Grade 1",
            "area": "North",
            "reason": "Sick"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(backend
        .submit_attendance(&common::student_absent())
        .await
        .is_accepted());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert!(body.get("branch").is_none());
}

#[tokio::test]
async fn test_conflict_is_duplicate_with_existing_record() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Alice already has an entry for today",
            "existingRecord": {
                "name": "Alice",
                "date": "2026-03-02",
                "action": "login",
                "time": "07:55"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::RejectedDuplicate { existing, message } => {
            assert_eq!(existing.action.as_deref(), Some("login"));
            assert_eq!(existing.time.as_deref(), Some("07:55"));
            assert_eq!(message.as_deref(), Some("Alice already has an entry for today"));
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_conflict_with_numeric_date_keeps_record() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Alice already logged in",
            "existingRecord": {
                "action": "login",
                "time": "08:00",
                "date": 20260302
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::RejectedDuplicate { existing, message } => {
            assert_eq!(message.as_deref(), Some("Alice already logged in"));
            assert_eq!(existing.action.as_deref(), Some("login"));
            assert_eq!(existing.time.as_deref(), Some("08:00"));
            assert_eq!(existing.date.as_deref(), Some("20260302"));
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_workflow_started_is_configuration_problem() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Workflow was started" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Backend);
            assert!(failure.reason.contains("configuration"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_false_is_failure() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Sheet is locked"
        })))
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => assert!(failure.reason.contains("Sheet is locked")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_success_is_invalid_response() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Backend);
            assert!(failure.reason.starts_with("Unexpected response"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_roster_fetch() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("GET"))
        .and(path("/raja-students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "Employee": { "Main": ["Alice", "Carol"] },
                "Student": { "Grade 1": { "North": ["Bob"] } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roster = backend.fetch_roster().await.unwrap();
    assert_eq!(roster.len(), 3);
    assert_eq!(roster.names(&OrgUnit::branch("Main")), ["Alice", "Carol"]);
    assert_eq!(roster.names(&OrgUnit::grade_area("Grade 1", "North")), ["Bob"]);
}

#[tokio::test]
async fn test_roster_polls_while_workflow_starts() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("GET"))
        .and(path("/raja-students"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Workflow was started" })),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raja-students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Employee": { "Main": ["Alice"] } }
        })))
        .mount(&server)
        .await;

    let roster = backend.fetch_roster().await.unwrap();
    assert_eq!(roster.names(&OrgUnit::branch("Main")), ["Alice"]);
    assert_eq!(common::request_count(&server).await, 3);
}

#[tokio::test]
async fn test_roster_gives_up_after_polling() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("GET"))
        .and(path("/raja-students"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Workflow was started" })),
        )
        .mount(&server)
        .await;

    let failure = backend.fetch_roster().await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Backend);
    // First request plus three polls
    assert_eq!(common::request_count(&server).await, 4);
}

#[tokio::test]
async fn test_roster_without_categories_is_rejected() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("GET"))
        .and(path("/raja-students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "Staff": {} } })))
        .mount(&server)
        .await;

    let failure = backend.fetch_roster().await.unwrap_err();
    assert!(failure.reason.contains("neither Employee nor Student"));
}

#[tokio::test]
async fn test_news_fetch() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("GET"))
        .and(path("/raja-data"))
        .and(query_param("type", "news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "news": [
                    {
                        "headline": "Sports day",
                        "subtitle": "Friday on the main field",
                        "image": "https://img.example.org/sports.png",
                        "priority": "High",
                        "dateCreated": "2026-02-27"
                    },
                    { "headline": "  ", "subtitle": "blank headline" },
                    { "headline": "Old notice", "active": false }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = backend.fetch_news().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].headline, "Sports day");
    assert!(items[0].show_image);
    assert_eq!(items[0].priority, NewsPriority::High);
    assert_eq!(items[0].date_created.to_string(), "2026-02-27");
    assert_eq!(items[1].status, NewsStatus::Inactive);
    assert_eq!(items[1].priority, NewsPriority::Medium);
}

#[tokio::test]
async fn test_update_news_unsupported() {
    let (_server, backend) = common::setup_workflow(common::fast_policy(false)).await;
    let item = rollcall_core::domain::NewsItem::new(
        "Headline",
        "",
        chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
    );

    let failure = backend.update_news(0, &item).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Unsupported);
}

#[tokio::test]
async fn test_connection_check_sends_flagged_probe() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .and(body_partial_json(json!({
            "name": "Connection Test",
            "test": true,
            "connection_test": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let message = backend.check_connection().await.unwrap();
    assert_eq!(message, "Workflow webhook connection working");
}
