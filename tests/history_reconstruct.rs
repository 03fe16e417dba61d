use playground_chat::{reconstruct, Role, Turn};
use playground_types::SessionRecord;
use pretty_assertions::assert_eq;
use serde_json::json;

fn record(value: serde_json::Value) -> SessionRecord {
    serde_json::from_value(value).expect("session record should parse")
}

#[test]
fn one_run_yields_user_then_agent_with_response_tools() {
    let session = record(json!({
        "session_id": "s-1",
        "agent_id": "agent-1",
        "user_id": null,
        "memory": {
            "runs": [{
                "message": {"role": "user", "content": "what is 2+2?", "created_at": 10},
                "response": {
                    "content": "4",
                    "created_at": 12,
                    "tools": [
                        {"tool_call_id": "t1", "tool_name": "calc", "content": "4"},
                        {"tool_call_id": "t2", "tool_name": "lookup"}
                    ]
                }
            }]
        },
        "agent_data": {}
    }));

    let turns = reconstruct(&session, 99);
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0], Turn::user("what is 2+2?", 10));
    assert_eq!(turns[1].role(), Role::Agent);

    let agent = turns[1].as_agent().expect("second turn should be the agent");
    assert_eq!(agent.content, "4");
    assert_eq!(agent.created_at, 12);
    let stored_tools = session.history()[0]
        .response
        .as_ref()
        .and_then(|response| response.tools.clone())
        .unwrap_or_default();
    assert_eq!(agent.tool_calls, stored_tools);
    assert!(!agent.streaming_error);
}

#[test]
fn top_level_runs_take_priority_over_memory() {
    let session = record(json!({
        "session_id": "s-1",
        "runs": [{"message": {"role": "user", "content": "top-level"}}],
        "memory": {"runs": [{"message": {"role": "user", "content": "memory"}}]}
    }));

    let turns = reconstruct(&session, 42);
    assert_eq!(turns, vec![Turn::user("top-level", 42)]);
}

#[test]
fn memory_chats_are_used_when_runs_are_missing() {
    let session = record(json!({
        "session_id": "s-1",
        "memory": {"chats": [{"response": {"content": "only the agent spoke"}}]}
    }));

    let turns = reconstruct(&session, 5);
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].content(), "only the agent spoke");
    assert_eq!(turns[0].created_at(), 5);
}

#[test]
fn tool_role_reasoning_messages_join_tool_list_and_collapse_duplicates() {
    let session = record(json!({
        "session_id": "s-1",
        "memory": {
            "runs": [{
                "response": {
                    "content": "done",
                    "tools": [{
                        "tool_call_id": "t1",
                        "tool_name": "search",
                        "tool_args": {"q": "rust"},
                        "created_at": 5
                    }],
                    "extra_data": {
                        "reasoning_messages": [
                            {"role": "assistant", "content": "thinking"},
                            {"role": "tool", "tool_call_id": "t1", "content": "result"},
                            {"role": "tool", "tool_call_id": "t2", "tool_name": "fetch"}
                        ]
                    }
                }
            }]
        }
    }));

    let turns = reconstruct(&session, 77);
    let agent = turns[0].as_agent().expect("agent turn");
    let ids = agent
        .tool_calls
        .iter()
        .map(|tool| tool.identity())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["t1", "t2"]);
    assert_eq!(agent.tool_calls[0].tool_name.as_deref(), Some("search"));
    assert_eq!(
        agent.tool_calls[0].tool_args,
        Some(serde_json::Map::from_iter([("q".to_string(), json!("rust"))]))
    );
    assert_eq!(agent.tool_calls[0].created_at, Some(5));
    assert_eq!(agent.tool_calls[0].content.as_deref(), Some("result"));
    assert_eq!(agent.tool_calls[1].created_at, Some(77));
    assert_eq!(agent.reasoning_messages.as_ref().map(Vec::len), Some(3));
}

#[test]
fn structured_content_is_normalized() {
    let session = record(json!({
        "session_id": "s-1",
        "memory": {
            "runs": [
                {
                    "message": {
                        "role": "user",
                        "content": [
                            {"type": "text", "text": "describe"},
                            {"type": "image_url", "image_url": {"url": "https://x"}},
                            {"type": "text", "text": "this"}
                        ]
                    },
                    "response": {"content": {"answer": 1}}
                }
            ]
        }
    }));

    let turns = reconstruct(&session, 1);
    assert_eq!(turns[0].content(), "describe this");
    assert_eq!(turns[1].content(), "```json\n{\n  \"answer\": 1\n}\n```");
}

#[test]
fn empty_record_yields_empty_transcript() {
    let session = record(json!({"session_id": "s-1"}));
    assert!(reconstruct(&session, 1).is_empty());
}
