//! Classification of streamed payloads into reducer inputs.
//!
//! Each [`RunResponse`] is decoded exactly once into a [`Fragment`] carrying
//! only the fields its event kind uses. Absent fields decode to `None` and
//! mean "no change" downstream.

use playground_types::{
    AudioData, ImageData, ReasoningStep, ReferenceData, ResponseAudio, RunEvent, RunResponse,
    Timestamp, ToolCall, VideoData,
};
use serde_json::Value;

/// Error notice used when a `RunError` fragment carries no content.
pub const DEFAULT_RUN_ERROR: &str = "Run failed";

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// `RunStarted` or `ReasoningStarted`.
    SessionStarted {
        session_id: Option<String>,
        created_at: Option<Timestamp>,
    },
    ToolCallStarted {
        tools: Vec<ToolCall>,
    },
    /// `RunResponse` or `RunResponseContent`.
    Content(ContentFragment),
    ReasoningCompleted {
        reasoning_steps: Option<Vec<ReasoningStep>>,
    },
    RunError {
        message: String,
    },
    Completed(CompletedFragment),
    /// Event kinds that never touch the transcript.
    Ignored {
        event: RunEvent,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBody {
    Text(String),
    /// Non-string, non-null content.
    Structured(Value),
    /// No content, but a response-audio transcript delta.
    AudioTranscript(String),
    Empty,
}

/// Shared media payload; each list replaces the previous one when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaUpdate {
    pub images: Option<Vec<ImageData>>,
    pub videos: Option<Vec<VideoData>>,
    pub audio: Option<Vec<AudioData>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentFragment {
    pub body: ContentBody,
    /// Single tool first, then the legacy list, in wire order.
    pub tools: Vec<ToolCall>,
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
    pub references: Option<Vec<ReferenceData>>,
    pub media: MediaUpdate,
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedFragment {
    pub content: Option<Value>,
    pub tools: Vec<ToolCall>,
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
    pub references: Option<Vec<ReferenceData>>,
    pub media: MediaUpdate,
    /// Replaces the turn's response audio wholesale, including with `None`.
    pub response_audio: Option<ResponseAudio>,
    pub created_at: Option<Timestamp>,
}

/// Decodes one payload. Total: every payload maps to some fragment.
#[must_use]
pub fn decode(response: RunResponse) -> Fragment {
    let RunResponse {
        event,
        content,
        session_id,
        tool,
        tools,
        created_at,
        extra_data,
        images,
        videos,
        audio,
        response_audio,
        ..
    } = response;

    let (reasoning_steps, references) = extra_data
        .map(|extra| (extra.reasoning_steps, extra.references))
        .unwrap_or_default();
    let media = MediaUpdate {
        images,
        videos,
        audio,
    };

    match event {
        RunEvent::RunStarted | RunEvent::ReasoningStarted => Fragment::SessionStarted {
            session_id: session_id.filter(|id| !id.is_empty()),
            created_at,
        },
        RunEvent::ToolCallStarted => Fragment::ToolCallStarted {
            tools: collect_tools(tool, tools),
        },
        RunEvent::RunResponse | RunEvent::RunResponseContent => {
            Fragment::Content(ContentFragment {
                body: content_body(content, response_audio),
                tools: collect_tools(tool, tools),
                reasoning_steps,
                references,
                media,
                created_at,
            })
        }
        RunEvent::ReasoningCompleted => Fragment::ReasoningCompleted { reasoning_steps },
        RunEvent::RunError => Fragment::RunError {
            message: error_message(content),
        },
        RunEvent::RunCompleted => Fragment::Completed(CompletedFragment {
            content,
            tools: collect_tools(tool, tools),
            reasoning_steps,
            references,
            media,
            response_audio,
            created_at,
        }),
        RunEvent::ToolCallCompleted
        | RunEvent::UpdatingMemory
        | RunEvent::ReasoningStep
        | RunEvent::Unknown => Fragment::Ignored { event },
    }
}

fn collect_tools(tool: Option<ToolCall>, tools: Option<Vec<ToolCall>>) -> Vec<ToolCall> {
    tool.into_iter().chain(tools.into_iter().flatten()).collect()
}

fn content_body(content: Option<Value>, response_audio: Option<ResponseAudio>) -> ContentBody {
    match content {
        Some(Value::String(text)) => ContentBody::Text(text),
        Some(Value::Null) | None => response_audio
            .and_then(|audio| audio.transcript)
            .filter(|transcript| !transcript.is_empty())
            .map(ContentBody::AudioTranscript)
            .unwrap_or(ContentBody::Empty),
        Some(structured) => ContentBody::Structured(structured),
    }
}

fn error_message(content: Option<Value>) -> String {
    match content {
        Some(Value::String(message)) if !message.is_empty() => message,
        Some(Value::Null) | None => DEFAULT_RUN_ERROR.to_string(),
        Some(Value::String(_)) => DEFAULT_RUN_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}
