//! Transcript model: ordered user and agent turns plus retry cleanup.

use playground_types::{
    AudioData, ImageData, ReasoningMessage, ReasoningStep, ReferenceData, ResponseAudio,
    Timestamp, ToolCall, VideoData,
};

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

/// Submitted user message. Never mutated after it enters the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTurn {
    pub content: String,
    pub created_at: Timestamp,
}

/// Agent response, mutable only while it is the tail under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTurn {
    pub content: String,
    /// Tool invocations in first-observed order, unique by identity.
    pub tool_calls: Vec<ToolCall>,
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
    pub reasoning_messages: Option<Vec<ReasoningMessage>>,
    pub references: Option<Vec<ReferenceData>>,
    pub images: Option<Vec<ImageData>>,
    pub videos: Option<Vec<VideoData>>,
    pub audio: Option<Vec<AudioData>>,
    pub response_audio: Option<ResponseAudio>,
    pub streaming_error: bool,
    pub created_at: Timestamp,
}

impl AgentTurn {
    /// Empty placeholder appended before the first fragment of a run arrives.
    #[must_use]
    pub fn pending(created_at: Timestamp) -> Self {
        Self {
            created_at,
            ..Self::default()
        }
    }

    /// Current response-audio transcript, or an empty string.
    #[must_use]
    pub fn audio_transcript(&self) -> &str {
        self.response_audio
            .as_ref()
            .and_then(|audio| audio.transcript.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(UserTurn),
    Agent(AgentTurn),
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>, created_at: Timestamp) -> Self {
        Self::User(UserTurn {
            content: content.into(),
            created_at,
        })
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Agent(_) => Role::Agent,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::User(turn) => &turn.content,
            Self::Agent(turn) => &turn.content,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        match self {
            Self::User(turn) => turn.created_at,
            Self::Agent(turn) => turn.created_at,
        }
    }

    #[must_use]
    pub fn as_agent(&self) -> Option<&AgentTurn> {
        match self {
            Self::Agent(turn) => Some(turn),
            Self::User(_) => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut AgentTurn> {
        match self {
            Self::Agent(turn) => Some(turn),
            Self::User(_) => None,
        }
    }

    /// True for an agent turn whose run ended in an error.
    #[must_use]
    pub fn is_failed_agent_turn(&self) -> bool {
        self.as_agent().is_some_and(|turn| turn.streaming_error)
    }
}

impl From<AgentTurn> for Turn {
    fn from(turn: AgentTurn) -> Self {
        Self::Agent(turn)
    }
}

impl From<UserTurn> for Turn {
    fn from(turn: UserTurn) -> Self {
        Self::User(turn)
    }
}

/// Drops a trailing `(user, failed agent)` pair so a retry replaces it.
///
/// Returns true when the pair was removed.
pub fn drop_failed_exchange(turns: &mut Vec<Turn>) -> bool {
    let len = turns.len();
    if len < 2 {
        return false;
    }

    let failed_tail = turns[len - 1].is_failed_agent_turn()
        && turns[len - 2].role() == Role::User;
    if failed_tail {
        turns.truncate(len - 2);
    }
    failed_tail
}

#[cfg(test)]
mod tests {
    use super::{drop_failed_exchange, AgentTurn, Role, Turn};

    fn failed_agent(created_at: i64) -> Turn {
        Turn::Agent(AgentTurn {
            streaming_error: true,
            ..AgentTurn::pending(created_at)
        })
    }

    #[test]
    fn drop_failed_exchange_removes_user_and_failed_agent() {
        let mut turns = vec![Turn::user("hi", 1), failed_agent(2)];
        assert!(drop_failed_exchange(&mut turns));
        assert!(turns.is_empty());
    }

    #[test]
    fn drop_failed_exchange_keeps_successful_agent_turn() {
        let mut turns = vec![Turn::user("hi", 1), Turn::Agent(AgentTurn::pending(2))];
        assert!(!drop_failed_exchange(&mut turns));
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn drop_failed_exchange_requires_user_before_failed_agent() {
        let mut turns = vec![failed_agent(1), failed_agent(2)];
        assert!(!drop_failed_exchange(&mut turns));
        assert_eq!(turns.len(), 2);

        let mut single = vec![failed_agent(1)];
        assert!(!drop_failed_exchange(&mut single));
    }

    #[test]
    fn turn_accessors_report_role_and_content() {
        let user = Turn::user("question", 10);
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.content(), "question");
        assert_eq!(user.created_at(), 10);
        assert!(user.as_agent().is_none());

        let agent = Turn::Agent(AgentTurn::pending(11));
        assert_eq!(agent.role(), Role::Agent);
        assert_eq!(agent.content(), "");
        assert_eq!(agent.as_agent().map(AgentTurn::audio_transcript), Some(""));
    }
}
