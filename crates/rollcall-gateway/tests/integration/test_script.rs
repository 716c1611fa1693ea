//! Integration tests for the script webhook backend

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rollcall_core::ports::{BackendResult, Delivery, IAttendanceBackend};
use rollcall_gateway::ScriptWebhookBackend;

use crate::common;

async fn setup_script() -> (MockServer, ScriptWebhookBackend) {
    let server = MockServer::start().await;
    let backend =
        ScriptWebhookBackend::new(format!("{}/exec", server.uri()), common::fast_policy(false))
            .unwrap();
    (server, backend)
}

#[tokio::test]
async fn test_submit_posts_form_encoded_data_field() {
    let (server, backend) = setup_script().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("data="))
        .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
        .expect(1)
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::Accepted { delivery, .. } => assert_eq!(delivery, Delivery::Remote),
        other => panic!("expected acceptance, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("%22name%22%3A%22Alice%22"));
    assert!(body.contains("%22source%22%3A%22Web+App%22"));
    // Placement fields that do not apply are sent empty
    assert!(body.contains("%22grade%22%3A%22%22"));
}

#[tokio::test]
async fn test_conflict_is_duplicate() {
    let (server, backend) = setup_script().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "existingRecord": { "action": "login", "time": "07:50" }
        })))
        .mount(&server)
        .await;

    match backend.submit_attendance(&common::employee_login()).await {
        BackendResult::RejectedDuplicate { existing, .. } => {
            assert_eq!(existing.time.as_deref(), Some("07:50"));
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_fails_after_retries() {
    let (server, backend) = setup_script().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    assert!(matches!(
        backend.submit_attendance(&common::employee_login()).await,
        BackendResult::Failed(_)
    ));
}

#[tokio::test]
async fn test_connection_check_gets_url() {
    let (server, backend) = setup_script().await;

    Mock::given(method("GET"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        backend.check_connection().await.unwrap(),
        "Script webhook reachable"
    );
}
