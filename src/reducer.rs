//! Per-run state machine folding decoded fragments into the transcript.
//!
//! A run moves `Idle -> Started -> Streaming -> {Completed | Errored}`. Only
//! the tail [`AgentTurn`] appended by [`StreamReducer::begin`] is mutated, and
//! fragments arriving after a terminal state are ignored.

use playground_types::{SessionSummary, Timestamp, ToolCall};

use crate::content::{completion_text, json_markdown};
use crate::context::ChatContext;
use crate::fragment::{CompletedFragment, ContentBody, ContentFragment, Fragment, MediaUpdate};
use crate::sessions;
use crate::tools::reconcile_into;
use crate::transcript::{drop_failed_exchange, AgentTurn, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Started,
    Streaming,
    Completed,
    Errored,
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

#[derive(Debug, Clone)]
pub struct StreamReducer {
    state: RunState,
    message: String,
    /// Timestamp passed to `begin`.
    started_at: Timestamp,
    /// Full content of the previous content fragment; the delta baseline.
    last_content: String,
    /// Session id current when the run began.
    prior_session_id: Option<String>,
    /// Session summary this run inserted and must roll back on failure.
    optimistic_session: Option<String>,
}

impl Default for StreamReducer {
    fn default() -> Self {
        Self {
            state: RunState::Idle,
            message: String::new(),
            started_at: 0,
            last_content: String::new(),
            prior_session_id: None,
            optimistic_session: None,
        }
    }
}

impl StreamReducer {
    /// Starts a run: drops a failed retry pair, then appends the user turn at
    /// `now` and an empty agent turn at `now + 1`.
    pub fn begin(ctx: &mut ChatContext, message: impl Into<String>, now: Timestamp) -> Self {
        let message = message.into();
        let turns = ctx.messages_mut();
        if drop_failed_exchange(turns) {
            tracing::debug!("dropped failed exchange before retry");
        }
        turns.push(Turn::user(message.clone(), now));
        turns.push(Turn::Agent(AgentTurn::pending(now + 1)));

        ctx.set_streaming(true);
        ctx.set_streaming_error_message(None);

        Self {
            state: RunState::Started,
            message,
            started_at: now,
            last_content: String::new(),
            prior_session_id: ctx.session_id().map(ToString::to_string),
            optimistic_session: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Session summary inserted by this run, if any.
    #[must_use]
    pub fn optimistic_session(&self) -> Option<&str> {
        self.optimistic_session.as_deref()
    }

    /// Applies one fragment. Returns false when the fragment was discarded
    /// because the run is not accepting fragments.
    pub fn apply(&mut self, ctx: &mut ChatContext, fragment: Fragment) -> bool {
        if !self.accepts_fragments() {
            tracing::debug!(state = ?self.state, "discarding fragment outside an active run");
            return false;
        }

        match fragment {
            Fragment::SessionStarted {
                session_id,
                created_at,
            } => {
                self.state = RunState::Streaming;
                if let Some(session_id) = session_id {
                    self.record_session(ctx, session_id, created_at);
                }
            }
            Fragment::ToolCallStarted { tools } => {
                self.state = RunState::Streaming;
                if !tools.is_empty() {
                    if let Some(turn) = tail_agent(ctx) {
                        reconcile_tools(turn, tools);
                    }
                }
            }
            Fragment::Content(content) => {
                self.state = RunState::Streaming;
                self.apply_content(ctx, content);
            }
            Fragment::ReasoningCompleted { reasoning_steps } => {
                self.state = RunState::Streaming;
                if let Some(steps) = reasoning_steps {
                    if let Some(turn) = tail_agent(ctx) {
                        turn.reasoning_steps = Some(steps);
                    }
                }
            }
            Fragment::RunError { message } => self.fail(ctx, message),
            Fragment::Completed(completed) => {
                if let Some(turn) = tail_agent(ctx) {
                    apply_completion(turn, completed);
                }
                self.state = RunState::Completed;
                tracing::debug!("run completed");
            }
            Fragment::Ignored { event } => {
                tracing::trace!(event = event.as_str(), "ignoring fragment");
            }
        }
        true
    }

    /// Marks the run as failed: flags the tail turn, records the notice and
    /// rolls back the optimistic session insert.
    pub fn fail(&mut self, ctx: &mut ChatContext, message: impl Into<String>) {
        if !self.accepts_fragments() {
            return;
        }

        let message = message.into();
        tracing::warn!(error = %message, "run failed");
        if let Some(turn) = tail_agent(ctx) {
            turn.streaming_error = true;
        }
        ctx.set_streaming_error_message(Some(message));

        if let Some(session_id) = self.optimistic_session.take() {
            if sessions::remove(ctx.sessions_mut(), &session_id) {
                tracing::debug!(session_id = %session_id, "rolled back optimistic session");
            }
        }
        self.state = RunState::Errored;
    }

    /// Clears the in-flight indicator. Runs on every path.
    pub fn finish(&self, ctx: &mut ChatContext) {
        ctx.set_streaming(false);
    }

    fn accepts_fragments(&self) -> bool {
        matches!(self.state, RunState::Started | RunState::Streaming)
    }

    fn record_session(
        &mut self,
        ctx: &mut ChatContext,
        session_id: String,
        created_at: Option<Timestamp>,
    ) {
        ctx.set_session_id(Some(session_id.clone()));

        let is_new_session = self.prior_session_id.as_deref() != Some(session_id.as_str());
        if !ctx.has_storage() || !is_new_session {
            return;
        }

        let summary = SessionSummary::new(
            session_id.clone(),
            self.message.clone(),
            created_at.unwrap_or(self.started_at),
        );
        if sessions::insert_optimistic(ctx.sessions_mut(), summary) {
            tracing::debug!(session_id = %session_id, "inserted optimistic session");
            self.optimistic_session = Some(session_id);
        }
    }

    fn apply_content(&mut self, ctx: &mut ChatContext, content: ContentFragment) {
        let ContentFragment {
            body,
            tools,
            reasoning_steps,
            references,
            media,
            created_at,
        } = content;

        match body {
            ContentBody::Text(text) => {
                let Some(turn) = tail_agent(ctx) else {
                    return;
                };
                turn.content.push_str(delta(&text, &self.last_content));
                self.last_content = text;

                reconcile_tools(turn, tools);
                if reasoning_steps.is_some() {
                    turn.reasoning_steps = reasoning_steps;
                }
                if references.is_some() {
                    turn.references = references;
                }
                replace_media(turn, media);
                if let Some(created_at) = created_at {
                    turn.created_at = created_at;
                }
            }
            ContentBody::Structured(value) => {
                let Some(turn) = tail_agent(ctx) else {
                    return;
                };
                let block = json_markdown(&value);
                turn.content.push_str(delta(&block, &self.last_content));
                self.last_content = block;
            }
            ContentBody::AudioTranscript(transcript) => {
                let Some(turn) = tail_agent(ctx) else {
                    return;
                };
                let audio = turn.response_audio.get_or_insert_with(Default::default);
                audio
                    .transcript
                    .get_or_insert_with(String::new)
                    .push_str(&transcript);
            }
            ContentBody::Empty => {}
        }
    }
}

/// Non-overlapping suffix of `content` relative to `baseline`.
fn delta<'a>(content: &'a str, baseline: &str) -> &'a str {
    content.strip_prefix(baseline).unwrap_or(content)
}

fn tail_agent(ctx: &mut ChatContext) -> Option<&mut AgentTurn> {
    ctx.messages_mut().last_mut().and_then(Turn::as_agent_mut)
}

fn reconcile_tools(turn: &mut AgentTurn, tools: Vec<ToolCall>) {
    for tool in tools {
        reconcile_into(&mut turn.tool_calls, tool);
    }
}

fn replace_media(turn: &mut AgentTurn, media: MediaUpdate) {
    let MediaUpdate {
        images,
        videos,
        audio,
    } = media;
    if images.is_some() {
        turn.images = images;
    }
    if videos.is_some() {
        turn.videos = videos;
    }
    if audio.is_some() {
        turn.audio = audio;
    }
}

fn apply_completion(turn: &mut AgentTurn, completed: CompletedFragment) {
    let CompletedFragment {
        content,
        tools,
        reasoning_steps,
        references,
        media,
        response_audio,
        created_at,
    } = completed;

    if let Some(content) = content.as_ref().filter(|value| !value.is_null()) {
        turn.content = completion_text(content);
    }
    reconcile_tools(turn, tools);
    replace_media(turn, media);
    turn.response_audio = response_audio;
    if reasoning_steps.is_some() {
        turn.reasoning_steps = reasoning_steps;
    }
    if references.is_some() {
        turn.references = references;
    }
    if let Some(created_at) = created_at {
        turn.created_at = created_at;
    }
}
