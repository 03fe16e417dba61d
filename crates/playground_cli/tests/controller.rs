use playground_api::{ClientConfig, PlaygroundClient};
use playground_chat::{NoopHost, Role, RunOutcome};
use playground_cli::{ControllerError, SessionController};
use playground_types::SessionSummary;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with_agents() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/status"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"agent_id": "finance", "name": "Finance", "storage": true,
             "model": {"name": "OpenAIChat", "model": "gpt-4o", "provider": "OpenAI"}},
            {"agent_id": "csv", "name": "CSV"}
        ])))
        .mount(&server)
        .await;
    server
}

fn controller(server: &MockServer) -> SessionController {
    let client = PlaygroundClient::new(ClientConfig::new(server.uri())).expect("client");
    SessionController::new(client)
}

#[tokio::test]
async fn initialize_selects_first_agent() {
    let server = server_with_agents().await;
    let mut controller = controller(&server);

    assert!(controller.initialize(None).await.expect("initialize"));
    let ctx = controller.context();
    assert!(ctx.is_endpoint_active());
    assert_eq!(ctx.agent_id(), Some("finance"));
    assert!(ctx.has_storage());
    assert_eq!(ctx.selected_model(), "OpenAI");
}

#[tokio::test]
async fn initialize_honors_preferred_agent() {
    let server = server_with_agents().await;
    let mut controller = controller(&server);

    controller.initialize(Some("csv")).await.expect("initialize");
    assert_eq!(controller.context().agent_id(), Some("csv"));
    assert!(!controller.context().has_storage());

    let error = controller
        .initialize(Some("ghost"))
        .await
        .expect_err("unknown agent");
    assert!(matches!(error, ControllerError::UnknownAgent(id) if id == "ghost"));
}

#[tokio::test]
async fn inactive_endpoint_loads_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let mut controller = controller(&server);

    assert!(!controller.initialize(None).await.expect("initialize"));
    assert!(!controller.context().is_endpoint_active());
    assert_eq!(controller.context().agent_id(), None);

    let outcome = controller.send(&mut NoopHost, "hello").await;
    assert_eq!(outcome, RunOutcome::NotStarted);
    assert!(controller.context().transcript().is_empty());
}

#[tokio::test]
async fn load_session_reconstructs_transcript() {
    let server = server_with_agents().await;
    Mock::given(method("GET"))
        .and(path("/v1/playground/agents/finance/sessions/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-1",
            "memory": {"runs": [{
                "message": {"role": "user", "content": "price of NVDA?", "created_at": 10},
                "response": {"content": "About $120.", "created_at": 12,
                             "tools": [{"tool_call_id": "t1", "tool_name": "get_price"}]}
            }]}
        })))
        .mount(&server)
        .await;
    let mut controller = controller(&server);
    controller.initialize(None).await.expect("initialize");

    let turns = controller.load_session("s-1").await.expect("session");

    assert_eq!(controller.context().session_id(), Some("s-1"));
    let roles = turns.iter().map(|turn| turn.role()).collect::<Vec<_>>();
    assert_eq!(roles, vec![Role::User, Role::Agent]);
    assert_eq!(turns[1].content(), "About $120.");
    let agent = turns[1].as_agent().expect("agent turn");
    assert_eq!(agent.tool_calls.len(), 1);
    assert_eq!(agent.tool_calls[0].tool_name.as_deref(), Some("get_price"));
}

#[tokio::test]
async fn deleting_current_session_starts_new_chat() {
    let server = server_with_agents().await;
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
            "runs": [{"message": {"role": "user", "content": "hi"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/playground/agents/finance/sessions/s-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let mut controller = controller(&server);
    controller.initialize(None).await.expect("initialize");
    controller.load_sessions().await.expect("sessions");
    controller.load_session("s-1").await.expect("session");

    controller.delete_session("s-1").await.expect("delete");

    let ctx = controller.context();
    assert_eq!(
        ctx.sessions().as_slice(),
        &[SessionSummary::new("s-2", "second", 20)]
    );
    assert_eq!(ctx.session_id(), None);
    assert!(ctx.transcript().is_empty());
}

#[tokio::test]
async fn send_streams_run_and_records_session() {
    let server = server_with_agents().await;
    let body = concat!(
        r#"{"event":"RunStarted","session_id":"s-9","created_at":100}"#,
        r#"{"event":"RunResponseContent","content":"Hel","created_at":101}"#,
        r#"{"event":"RunResponseContent","content":"Hello","created_at":102}"#,
        r#"{"event":"RunCompleted","content":"Hello!","created_at":103}"#,
    );
    Mock::given(method("POST"))
        .and(path("/v1/playground/agents/finance/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    let mut controller = controller(&server);
    controller.initialize(None).await.expect("initialize");

    let outcome = controller.send(&mut NoopHost, "hi").await;

    assert_eq!(outcome, RunOutcome::Completed);
    let ctx = controller.context();
    assert_eq!(ctx.session_id(), Some("s-9"));
    assert_eq!(ctx.transcript()[1].content(), "Hello!");
    assert_eq!(ctx.sessions()[0], SessionSummary::new("s-9", "hi", 100));
    assert!(!ctx.is_streaming());
}

#[tokio::test]
async fn send_failure_marks_turn_and_keeps_notice() {
    let server = server_with_agents().await;
    Mock::given(method("POST"))
        .and(path("/v1/playground/agents/finance/runs"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "model offline"})))
        .mount(&server)
        .await;
    let mut controller = controller(&server);
    controller.initialize(None).await.expect("initialize");

    let outcome = controller.send(&mut NoopHost, "hi").await;

    match outcome {
        RunOutcome::Failed { message } => assert!(message.contains("model offline")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let ctx = controller.context();
    assert!(ctx.transcript()[1].is_failed_agent_turn());
    assert!(ctx.sessions().is_empty());
}
