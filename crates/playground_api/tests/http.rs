use futures_util::StreamExt;
use playground_api::{ClientConfig, PlaygroundApiError, PlaygroundClient};
use playground_types::{RunEvent, RunRequest};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> PlaygroundClient {
    PlaygroundClient::new(ClientConfig::new(server.uri())).expect("client")
}

#[test]
fn invalid_endpoint_is_rejected() {
    let error = PlaygroundClient::new(ClientConfig::new("http://exa mple.com"))
        .expect_err("endpoint with a space should fail");
    assert!(matches!(error, PlaygroundApiError::InvalidEndpoint(_)));
}

#[test]
fn run_request_posts_multipart_form_to_agent_route() {
    let client = PlaygroundClient::new(ClientConfig::new("localhost:7777")).expect("client");
    let request = client
        .build_run_request(&RunRequest::streaming("finance", "hello", Some("s-1")))
        .build()
        .expect("request");

    assert_eq!(request.method(), "POST");
    assert_eq!(
        request.url().as_str(),
        "http://localhost:7777/v1/playground/agents/finance/runs"
    );
    let content_type = request
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn status_reports_http_code_without_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert_eq!(client(&server).status().await.expect("status"), 503);
}

#[tokio::test]
async fn agents_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "agent_id": "finance",
                "name": "Finance Agent",
                "model": {"name": "OpenAIChat", "model": "gpt-4o", "provider": "OpenAI"},
                "storage": true
            },
            {"agent_id": "csv", "name": "CSV Agent"}
        ])))
        .mount(&server)
        .await;

    let agents = client(&server).agents().await.expect("agents");
    assert_eq!(agents.len(), 2);
    assert!(agents[0].has_storage());
    assert_eq!(agents[0].model_provider(), "OpenAI");
    assert!(!agents[1].has_storage());
}

#[tokio::test]
async fn sessions_not_found_means_storage_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/agents/csv/sessions"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sessions = client(&server).sessions("csv").await.expect("sessions");
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn sessions_and_session_record_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/agents/finance/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"session_id": "s-2", "title": "second", "created_at": 20},
            {"session_id": "s-1", "title": "first", "created_at": 10}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/agents/finance/sessions/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-1",
            "agent_id": "finance",
            "user_id": null,
            "memory": {"runs": [{"message": {"role": "user", "content": "hi"}}]},
            "agent_data": {}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let sessions = client.sessions("finance").await.expect("sessions");
    assert_eq!(sessions[0].session_id, "s-2");

    let record = client.session("finance", "s-1").await.expect("session");
    assert_eq!(record.history().len(), 1);
}

#[tokio::test]
async fn delete_session_surfaces_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/playground/agents/finance/sessions/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Session not found"})),
        )
        .mount(&server)
        .await;

    let error = client(&server)
        .delete_session("finance", "missing")
        .await
        .expect_err("delete should fail");
    assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(error.to_string(), "HTTP 404 Not Found: Session not found");
}

#[tokio::test]
async fn stream_run_yields_decoded_payloads() {
    let server = MockServer::start().await;
    let body = concat!(
        r#"{"event":"RunStarted","session_id":"s-1"}"#,
        r#"{"event":"RunResponseContent","content":"Hi"}"#,
        r#"{"event":"RunCompleted","content":"Hi!"}"#,
    );
    Mock::given(method("POST"))
        .and(path("/v1/playground/agents/finance/runs"))
        .and(body_string_contains("name=\"message\""))
        .and(body_string_contains("name=\"stream\""))
        .and(body_string_contains("name=\"session_id\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let stream = client(&server)
        .stream_run(&RunRequest::streaming("finance", "hello", None), None)
        .await
        .expect("stream should open");
    let events = stream
        .map(|item| item.expect("payload").event)
        .collect::<Vec<_>>()
        .await;

    assert_eq!(
        events,
        vec![
            RunEvent::RunStarted,
            RunEvent::RunResponseContent,
            RunEvent::RunCompleted
        ]
    );
}

#[tokio::test]
async fn stream_run_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/playground/agents/ghost/runs"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Agent not found"})))
        .mount(&server)
        .await;

    let result = client(&server)
        .stream_run(&RunRequest::streaming("ghost", "hello", None), None)
        .await;

    match result {
        Err(PlaygroundApiError::Status { status, message }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Agent not found");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("stream should not open"),
    }
}
