//! Per-endpoint conversation state shared by the reducer, the reconstructor
//! and the session controller.
//!
//! Collections are published as `Arc` snapshots. Every mutation goes through
//! [`Arc::make_mut`], so a snapshot handed to a renderer never observes later
//! changes.

use std::sync::Arc;

use playground_types::{Agent, SessionSummary, Timestamp};
use time::OffsetDateTime;

use crate::sessions;
use crate::transcript::Turn;

/// Current wall-clock time in unix seconds.
#[must_use]
pub fn now_unix() -> Timestamp {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Consistent view of the context handed to a [`ChatHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub messages: Arc<Vec<Turn>>,
    pub sessions: Arc<Vec<SessionSummary>>,
    pub session_id: Option<String>,
    pub is_streaming: bool,
    pub streaming_error_message: Option<String>,
}

/// UI boundary notified while a run is driven.
pub trait ChatHost {
    /// Called after each applied mutation, before the next fragment is awaited.
    fn publish(&mut self, _snapshot: &ChatSnapshot) {}

    /// Called once when a run finishes, on every path.
    fn focus_input(&mut self) {}
}

/// Host that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl ChatHost for NoopHost {}

#[derive(Debug, Clone)]
pub struct ChatContext {
    endpoint: String,
    is_endpoint_active: bool,
    agents: Vec<Agent>,
    agent_id: Option<String>,
    has_storage: bool,
    selected_model: String,
    session_id: Option<String>,
    messages: Arc<Vec<Turn>>,
    sessions: Arc<Vec<SessionSummary>>,
    is_streaming: bool,
    streaming_error_message: Option<String>,
}

impl ChatContext {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            is_endpoint_active: false,
            agents: Vec::new(),
            agent_id: None,
            has_storage: false,
            selected_model: String::new(),
            session_id: None,
            messages: Arc::new(Vec::new()),
            sessions: Arc::new(Vec::new()),
            is_streaming: false,
            streaming_error_message: None,
        }
    }

    /// Discards all state and starts over against `endpoint`.
    pub fn reset_for_endpoint(&mut self, endpoint: impl Into<String>) {
        *self = Self::new(endpoint);
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn is_endpoint_active(&self) -> bool {
        self.is_endpoint_active
    }

    pub fn set_endpoint_active(&mut self, active: bool) {
        self.is_endpoint_active = active;
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Replaces the agent list and refreshes the selected agent's attributes.
    pub fn set_agents(&mut self, agents: Vec<Agent>) {
        self.agents = agents;
        if let Some(selected) = self.selected_agent().cloned() {
            self.apply_agent_attributes(&selected);
        }
    }

    /// Selects `agent_id` from the known agents.
    ///
    /// Switching to a different agent starts a new chat. Returns false when
    /// the id is unknown, leaving the selection unchanged.
    pub fn select_agent(&mut self, agent_id: &str) -> bool {
        let Some(agent) = self
            .agents
            .iter()
            .find(|agent| agent.agent_id == agent_id)
            .cloned()
        else {
            return false;
        };

        if self.agent_id.as_deref() != Some(agent_id) {
            self.clear_chat();
            self.agent_id = Some(agent.agent_id.clone());
        }
        self.apply_agent_attributes(&agent);
        true
    }

    #[must_use]
    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    #[must_use]
    pub fn selected_agent(&self) -> Option<&Agent> {
        let agent_id = self.agent_id.as_deref()?;
        self.agents.iter().find(|agent| agent.agent_id == agent_id)
    }

    #[must_use]
    pub fn has_storage(&self) -> bool {
        self.has_storage
    }

    #[must_use]
    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id.filter(|id| !id.is_empty());
    }

    /// Snapshot of the transcript.
    #[must_use]
    pub fn messages(&self) -> Arc<Vec<Turn>> {
        Arc::clone(&self.messages)
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.messages
    }

    /// Snapshot of the session list.
    #[must_use]
    pub fn sessions(&self) -> Arc<Vec<SessionSummary>> {
        Arc::clone(&self.sessions)
    }

    pub fn set_sessions(&mut self, sessions: Vec<SessionSummary>) {
        self.sessions = Arc::new(sessions);
    }

    /// Drops `session_id` from the list. Deleting the current session also
    /// starts a new chat.
    pub fn remove_session(&mut self, session_id: &str) -> bool {
        let removed = sessions::contains(&self.sessions, session_id)
            && sessions::remove(self.sessions_mut(), session_id);
        if self.session_id.as_deref() == Some(session_id) {
            self.clear_chat();
        }
        removed
    }

    /// Replaces the transcript with a reconstructed session.
    pub fn load_transcript(&mut self, session_id: impl Into<String>, turns: Vec<Turn>) {
        self.messages = Arc::new(turns);
        self.set_session_id(Some(session_id.into()));
        self.streaming_error_message = None;
    }

    /// Starts a new chat: empty transcript, no current session.
    pub fn clear_chat(&mut self) {
        self.messages = Arc::new(Vec::new());
        self.session_id = None;
        self.streaming_error_message = None;
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    #[must_use]
    pub fn streaming_error_message(&self) -> Option<&str> {
        self.streaming_error_message.as_deref()
    }

    #[must_use]
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.messages(),
            sessions: self.sessions(),
            session_id: self.session_id.clone(),
            is_streaming: self.is_streaming,
            streaming_error_message: self.streaming_error_message.clone(),
        }
    }

    pub(crate) fn messages_mut(&mut self) -> &mut Vec<Turn> {
        Arc::make_mut(&mut self.messages)
    }

    pub(crate) fn sessions_mut(&mut self) -> &mut Vec<SessionSummary> {
        Arc::make_mut(&mut self.sessions)
    }

    pub(crate) fn set_streaming(&mut self, streaming: bool) {
        self.is_streaming = streaming;
    }

    pub(crate) fn set_streaming_error_message(&mut self, message: Option<String>) {
        self.streaming_error_message = message;
    }

    fn apply_agent_attributes(&mut self, agent: &Agent) {
        self.has_storage = agent.has_storage();
        self.selected_model = agent.model_provider().to_string();
    }
}
