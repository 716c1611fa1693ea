//! Integration tests for per-attempt timeouts and fixed-delay retry

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use rollcall_core::ports::{BackendResult, FailureKind, IAttendanceBackend};
use rollcall_gateway::{RetryPolicy, WorkflowWebhookBackend};

use crate::common;

fn slow_ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "success": true }))
        .set_delay(Duration::from_millis(800))
}

#[tokio::test]
async fn test_timeout_is_not_retried_by_default() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(slow_ok())
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Transient);
            assert!(failure.reason.starts_with("Request timed out"));
        }
        other => panic!("expected timeout failure, got {other:?}"),
    }
    assert_eq!(common::request_count(&server).await, 1);
}

#[tokio::test]
async fn test_timeout_retried_when_enabled() {
    let (server, backend) = common::setup_workflow(common::fast_policy(true)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(slow_ok())
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    assert!(backend
        .submit_attendance(&common::employee_login())
        .await
        .is_accepted());
    assert_eq!(common::request_count(&server).await, 3);
}

#[tokio::test]
async fn test_server_error_retried_until_attempts_run_out() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Backend);
            assert_eq!(
                failure.reason,
                "Server error. Please try again later or contact support."
            );
        }
        other => panic!("expected server failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_recovers_after_transient_error() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    assert!(backend
        .submit_attendance(&common::employee_login())
        .await
        .is_accepted());
    assert_eq!(common::request_count(&server).await, 2);
}

#[tokio::test]
async fn test_not_found_message() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => assert_eq!(
            failure.reason,
            "Workflow not found. Please check the webhook URL configuration."
        ),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_body_message_is_kept() {
    let (server, backend) = common::setup_workflow(common::fast_policy(false)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Unknown branch" })),
        )
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => {
            assert_eq!(failure.reason, "Error: HTTP 422: Unknown branch")
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_network_failure() {
    // Nothing listens on the discard port
    let backend =
        WorkflowWebhookBackend::new("http://127.0.0.1:9", common::fast_policy(false)).unwrap();

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Failed(failure) => assert_eq!(failure.kind, FailureKind::Transient),
        other => panic!("expected network failure, got {other:?}"),
    }
}

fn spaced_policy(delay: Duration) -> RetryPolicy {
    RetryPolicy {
        delay,
        ..common::fast_policy(false)
    }
}

#[tokio::test]
async fn test_delay_is_waited_between_attempts() {
    let delay = Duration::from_millis(400);
    let (server, backend) = common::setup_workflow(spaced_policy(delay)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let started = Instant::now();
    let result = backend.submit_attendance(&common::employee_login()).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, BackendResult::Failed(_)));
    // Two gaps for three attempts, none before the first
    assert!(elapsed >= delay * 2, "finished too early: {elapsed:?}");
    assert!(elapsed < delay * 3, "waited before the first attempt: {elapsed:?}");
}

#[tokio::test]
async fn test_first_attempt_is_not_delayed() {
    let delay = Duration::from_secs(2);
    let (server, backend) = common::setup_workflow(spaced_policy(delay)).await;

    Mock::given(method("POST"))
        .and(path("/raja-attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    assert!(backend
        .submit_attendance(&common::employee_login())
        .await
        .is_accepted());
    assert!(started.elapsed() < delay);
}
