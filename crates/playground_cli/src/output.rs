//! Plain-text rendering for the terminal: listings on stdout, streamed agent
//! text on stdout, tool notices and errors on stderr.

use std::io::{self, Write};

use playground_chat::{ChatHost, ChatSnapshot, Turn};
use playground_types::{Agent, SessionSummary, Timestamp};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Streams the tail agent turn as it grows.
///
/// Only the new suffix of the content is written on each publish. When a
/// completion rewrites the content wholesale, the rewritten text is written
/// on a fresh line.
pub struct TerminalHost<W, E> {
    out: W,
    err: E,
    tail_index: Option<usize>,
    printed: String,
    tools_seen: usize,
    error_message: Option<String>,
}

impl TerminalHost<io::Stdout, io::Stderr> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> TerminalHost<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            out,
            err,
            tail_index: None,
            printed: String::new(),
            tools_seen: 0,
            error_message: None,
        }
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }

    fn render(&mut self, snapshot: &ChatSnapshot) -> io::Result<()> {
        self.error_message = snapshot.streaming_error_message.clone();

        let Some((index, turn)) = snapshot
            .messages
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, turn)| turn.as_agent().map(|agent| (index, agent)))
        else {
            return Ok(());
        };

        if self.tail_index != Some(index) {
            self.tail_index = Some(index);
            self.printed.clear();
            self.tools_seen = 0;
        }

        for tool in turn.tool_calls.iter().skip(self.tools_seen) {
            let name = tool.tool_name.as_deref().unwrap_or("tool");
            writeln!(self.err, "[tool] {name}")?;
        }
        self.tools_seen = turn.tool_calls.len();

        if let Some(delta) = turn.content.strip_prefix(self.printed.as_str()) {
            self.out.write_all(delta.as_bytes())?;
        } else {
            write!(self.out, "\n{}", turn.content)?;
        }
        self.printed.clone_from(&turn.content);
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        if !self.printed.is_empty() {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        if let Some(message) = self.error_message.take() {
            writeln!(self.err, "error: {message}")?;
        }
        self.printed.clear();
        self.tail_index = None;
        self.tools_seen = 0;
        self.err.flush()
    }
}

impl<W: Write, E: Write> ChatHost for TerminalHost<W, E> {
    fn publish(&mut self, snapshot: &ChatSnapshot) {
        if let Err(error) = self.render(snapshot) {
            tracing::warn!(%error, "failed to write streamed output");
        }
    }

    fn focus_input(&mut self) {
        if let Err(error) = self.finish() {
            tracing::warn!(%error, "failed to write run summary");
        }
    }
}

/// RFC 3339 rendering of a unix timestamp, or the raw number when out of range.
#[must_use]
pub fn format_timestamp(timestamp: Timestamp) -> String {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn write_agents(out: &mut impl Write, agents: &[Agent], selected: Option<&str>) -> io::Result<()> {
    if agents.is_empty() {
        return writeln!(out, "no agents");
    }
    for agent in agents {
        let marker = if selected == Some(agent.agent_id.as_str()) { "*" } else { " " };
        let storage = if agent.has_storage() { "storage" } else { "no storage" };
        let model = agent
            .model
            .as_ref()
            .map(|model| format!("{} ({})", model.model, model.provider))
            .unwrap_or_default();
        writeln!(
            out,
            "{marker} {}\t{}\t{model}\t{storage}",
            agent.agent_id, agent.name
        )?;
    }
    Ok(())
}

pub fn write_sessions(out: &mut impl Write, sessions: &[SessionSummary]) -> io::Result<()> {
    if sessions.is_empty() {
        return writeln!(out, "no sessions");
    }
    for session in sessions {
        writeln!(
            out,
            "{}\t{}\t{}",
            session.session_id,
            format_timestamp(session.created_at),
            session.title
        )?;
    }
    Ok(())
}

pub fn write_transcript(out: &mut impl Write, turns: &[Turn]) -> io::Result<()> {
    for turn in turns {
        match turn {
            Turn::User(user) => writeln!(out, "> {}", user.content)?,
            Turn::Agent(agent) => {
                for tool in &agent.tool_calls {
                    writeln!(out, "[tool] {}", tool.tool_name.as_deref().unwrap_or("tool"))?;
                }
                if !agent.content.is_empty() {
                    writeln!(out, "{}", agent.content)?;
                }
                let transcript = agent.audio_transcript();
                if !transcript.is_empty() {
                    writeln!(out, "[audio] {transcript}")?;
                }
                if agent.streaming_error {
                    writeln!(out, "[error]")?;
                }
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
