//! Rebuilds a transcript from a persisted session record.

use playground_types::{
    ChatEntry, ChatResponse, MessageRole, ReasoningMessage, SessionRecord, Timestamp, ToolCall,
    ToolMetrics,
};

use crate::content::normalize_content;
use crate::tools::{matching_position, reconcile_all, reconcile_into};
use crate::transcript::{AgentTurn, Turn, UserTurn};

/// Flattens `record` into turns: per run entry, an optional user turn
/// followed by an optional agent turn.
///
/// `now` stands in for timestamps the record leaves out.
#[must_use]
pub fn reconstruct(record: &SessionRecord, now: Timestamp) -> Vec<Turn> {
    let history = record.history();
    let mut turns = Vec::with_capacity(history.len() * 2);
    for entry in history {
        append_entry(&mut turns, entry, now);
    }
    tracing::debug!(
        session_id = %record.session_id,
        runs = history.len(),
        turns = turns.len(),
        "reconstructed session"
    );
    turns
}

fn append_entry(turns: &mut Vec<Turn>, entry: &ChatEntry, now: Timestamp) {
    if let Some(message) = &entry.message {
        turns.push(Turn::User(UserTurn {
            content: normalize_content(message.content.as_ref()),
            created_at: message.created_at.unwrap_or(now),
        }));
    }
    if let Some(response) = &entry.response {
        turns.push(Turn::Agent(agent_turn(response, now)));
    }
}

fn agent_turn(response: &ChatResponse, now: Timestamp) -> AgentTurn {
    let extra = response.extra_data.as_ref();
    let reasoning_messages = extra.and_then(|extra| extra.reasoning_messages.clone());

    let mut tool_calls = reconcile_all(response.tools.iter().flatten().cloned(), Vec::new());
    for message in reasoning_messages
        .iter()
        .flatten()
        .filter(|message| message.role == MessageRole::Tool)
    {
        fold_reasoning_tool(&mut tool_calls, tool_from_reasoning(message), now);
    }

    AgentTurn {
        content: normalize_content(response.content.as_ref()),
        tool_calls,
        reasoning_steps: extra.and_then(|extra| extra.reasoning_steps.clone()),
        reasoning_messages,
        references: extra.and_then(|extra| extra.references.clone()),
        images: response.images.clone(),
        videos: response.videos.clone(),
        audio: response.audio.clone(),
        response_audio: response.response_audio.clone(),
        streaming_error: false,
        created_at: response.created_at.unwrap_or(now),
    }
}

fn tool_from_reasoning(message: &ReasoningMessage) -> ToolCall {
    ToolCall {
        role: Some(message.role),
        content: message.content.clone(),
        tool_call_id: message.tool_call_id.clone(),
        tool_name: message.tool_name.clone(),
        tool_args: message.tool_args.clone(),
        tool_call_error: message.tool_call_error,
        metrics: message.metrics,
        created_at: message.created_at,
    }
}

// Metrics and timestamp are defaulted only for calls that start a new entry,
// so a merge never overwrites recorded values with placeholders.
fn fold_reasoning_tool(tools: &mut Vec<ToolCall>, mut call: ToolCall, now: Timestamp) {
    if matching_position(tools, &call).is_none() {
        call.metrics.get_or_insert(ToolMetrics { time: 0.0 });
        call.created_at.get_or_insert(now);
    }
    reconcile_into(tools, call);
}

#[cfg(test)]
mod tests {
    use playground_types::{MessageRole, ReasoningMessage, ToolCall, ToolMetrics};
    use pretty_assertions::assert_eq;

    use super::{fold_reasoning_tool, tool_from_reasoning};

    fn tool_message(id: Option<&str>) -> ReasoningMessage {
        ReasoningMessage {
            role: MessageRole::Tool,
            content: Some("42".to_string()),
            tool_call_id: id.map(ToString::to_string),
            tool_name: None,
            tool_args: None,
            tool_call_error: None,
            metrics: None,
            created_at: None,
        }
    }

    #[test]
    fn appended_reasoning_tool_gets_metrics_and_timestamp_defaults() {
        let mut tools = Vec::new();
        fold_reasoning_tool(&mut tools, tool_from_reasoning(&tool_message(None)), 500);

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].metrics, Some(ToolMetrics { time: 0.0 }));
        assert_eq!(tools[0].created_at, Some(500));
        assert_eq!(tools[0].tool_name, None);
        assert_eq!(tools[0].tool_args, None);
        assert_eq!(tools[0].content.as_deref(), Some("42"));
    }

    #[test]
    fn merged_reasoning_tool_keeps_recorded_values() {
        let mut tools = vec![ToolCall {
            tool_call_id: Some("t1".to_string()),
            tool_name: Some("search".to_string()),
            metrics: Some(ToolMetrics { time: 2.5 }),
            created_at: Some(5),
            ..ToolCall::default()
        }];
        fold_reasoning_tool(&mut tools, tool_from_reasoning(&tool_message(Some("t1"))), 500);

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].tool_name.as_deref(), Some("search"));
        assert_eq!(tools[0].metrics, Some(ToolMetrics { time: 2.5 }));
        assert_eq!(tools[0].created_at, Some(5));
        assert_eq!(tools[0].content.as_deref(), Some("42"));
    }
}
