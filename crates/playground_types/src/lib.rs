//! Provider-neutral wire contract for agent playground runs.
//!
//! This crate defines only the payload shapes exchanged with a playground
//! server: streamed run-response fragments, tool-call records, media and
//! reasoning extras, and the request that starts a run. Transport details and
//! transcript reconciliation live in other crates.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

mod session;

pub use session::{
    Agent, ChatEntry, ChatMessage, ChatResponse, ModelInfo, SessionMemory, SessionRecord,
    SessionSummary,
};

/// Unix timestamp in whole seconds, as carried by `created_at` fields.
pub type Timestamp = i64;

// Explicit `null` reads the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Event-kind tag carried by every streamed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunEvent {
    RunStarted,
    RunResponse,
    RunResponseContent,
    RunCompleted,
    RunError,
    ToolCallStarted,
    ToolCallCompleted,
    UpdatingMemory,
    ReasoningStarted,
    ReasoningStep,
    ReasoningCompleted,
    /// Any tag this client does not know about.
    #[serde(other)]
    Unknown,
}

impl RunEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStarted => "RunStarted",
            Self::RunResponse => "RunResponse",
            Self::RunResponseContent => "RunResponseContent",
            Self::RunCompleted => "RunCompleted",
            Self::RunError => "RunError",
            Self::ToolCallStarted => "ToolCallStarted",
            Self::ToolCallCompleted => "ToolCallCompleted",
            Self::UpdatingMemory => "UpdatingMemory",
            Self::ReasoningStarted => "ReasoningStarted",
            Self::ReasoningStep => "ReasoningStep",
            Self::ReasoningCompleted => "ReasoningCompleted",
            Self::Unknown => "Unknown",
        }
    }
}

/// Role attached to tool calls and reasoning messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Tool,
    System,
    Assistant,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolMetrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: f64,
}

/// One observed tool invocation.
///
/// Every field is optional on the wire; an absent field never clears a value
/// already recorded for the same call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ToolMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl ToolCall {
    /// Explicit call identifier, when present and non-empty.
    #[must_use]
    pub fn explicit_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Identifier synthesized from tool name and creation timestamp.
    #[must_use]
    pub fn composite_id(&self) -> String {
        let name = self.tool_name.as_deref().unwrap_or_default();
        match self.created_at {
            Some(created_at) => format!("{name}-{created_at}"),
            None => format!("{name}-"),
        }
    }

    /// Identity used for reconciliation: explicit id, else name + timestamp.
    #[must_use]
    pub fn identity(&self) -> String {
        self.explicit_id()
            .map(ToString::to_string)
            .unwrap_or_else(|| self.composite_id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

/// Message from an agent's reasoning trace; tool-role entries describe tool calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ToolMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chunk: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chunk_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta_data: ReferenceMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Knowledge lookup performed while answering, with the documents it returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

/// Reasoning and reference extras attached to a fragment or a stored response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_messages: Option<Vec<ReasoningMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ReferenceData>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

/// Spoken form of the agent response; `transcript` grows while streaming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseAudio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

/// One streamed payload object, already deframed by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub event: RunEvent,
    /// String text, or any structured value the agent produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolCall>,
    /// Legacy list form of tool calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<ExtraData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<VideoData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Vec<AudioData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_audio: Option<ResponseAudio>,
}

impl RunResponse {
    /// Creates a fragment carrying only an event tag.
    #[must_use]
    pub fn new(event: RunEvent) -> Self {
        Self {
            event,
            content: None,
            content_type: None,
            model: None,
            run_id: None,
            agent_id: None,
            session_id: None,
            tool: None,
            tools: None,
            created_at: None,
            extra_data: None,
            images: None,
            videos: None,
            audio: None,
            response_audio: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<Value>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: ToolCall) -> Self {
        self.tool = Some(tool);
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolCall>) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// Input required to start a streamed run against one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub agent_id: String,
    pub message: String,
    pub stream: bool,
    /// Empty when the run should start a new session.
    pub session_id: String,
}

impl RunRequest {
    #[must_use]
    pub fn streaming(
        agent_id: impl Into<String>,
        message: impl Into<String>,
        session_id: Option<&str>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            message: message.into(),
            stream: true,
            session_id: session_id.unwrap_or_default().to_string(),
        }
    }

    /// Form fields in submission order.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("message", self.message.clone()),
            ("stream", self.stream.to_string()),
            ("session_id", self.session_id.clone()),
        ]
    }
}
