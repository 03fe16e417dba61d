use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    AudioData, ExtraData, ImageData, MessageRole, ResponseAudio, Timestamp, ToolCall, VideoData,
};

/// Sidebar entry for one persisted session, listed most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    /// Literal user message that started the session.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub created_at: Timestamp,
}

impl SessionSummary {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        title: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            title: title.into(),
            created_at,
        }
    }
}

/// Completed session as returned by the session fetch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<Vec<ChatEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<SessionMemory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_data: Option<Value>,
}

impl SessionRecord {
    /// Run history in priority order: top-level `runs`, `memory.runs`, `memory.chats`.
    #[must_use]
    pub fn history(&self) -> &[ChatEntry] {
        if let Some(runs) = &self.runs {
            return runs;
        }

        self.memory
            .as_ref()
            .and_then(|memory| memory.runs.as_deref().or(memory.chats.as_deref()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<Vec<ChatEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chats: Option<Vec<ChatEntry>>,
}

/// One stored exchange: an optional request and an optional response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChatResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolCall>>,
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
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub provider: String,
}

/// Agent served by a playground endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub agent_id: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: Option<ModelInfo>,
    /// Whether the agent persists sessions server-side.
    #[serde(default)]
    pub storage: Option<bool>,
}

impl Agent {
    #[must_use]
    pub fn has_storage(&self) -> bool {
        self.storage.unwrap_or(false)
    }

    #[must_use]
    pub fn model_provider(&self) -> &str {
        self.model
            .as_ref()
            .map(|model| model.provider.as_str())
            .unwrap_or_default()
    }
}
