//! Session lifecycle against one playground endpoint.

use std::sync::Arc;

use playground_api::{PlaygroundApiError, PlaygroundClient};
use playground_chat::{drive, now_unix, reconstruct, ChatContext, ChatHost, RunOutcome, Turn};

use crate::transport::ApiTransport;

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("no agent selected")]
    NoAgentSelected,
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    #[error(transparent)]
    Api(#[from] PlaygroundApiError),
}

/// Owns the conversation context and the transport for one endpoint.
pub struct SessionController {
    ctx: ChatContext,
    transport: ApiTransport,
}

impl SessionController {
    #[must_use]
    pub fn new(client: PlaygroundClient) -> Self {
        let ctx = ChatContext::new(client.endpoint());
        Self {
            ctx,
            transport: ApiTransport::new(client),
        }
    }

    #[must_use]
    pub fn context(&self) -> &ChatContext {
        &self.ctx
    }

    #[must_use]
    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    fn client(&self) -> &PlaygroundClient {
        self.transport.client()
    }

    fn require_agent(&self) -> Result<String, ControllerError> {
        self.ctx
            .agent_id()
            .map(ToString::to_string)
            .ok_or(ControllerError::NoAgentSelected)
    }

    /// Probes the endpoint and loads its agents.
    ///
    /// An unreachable endpoint is reported as inactive rather than as an
    /// error. `preferred_agent` is selected when given; otherwise the first
    /// agent is selected if none is.
    pub async fn initialize(&mut self, preferred_agent: Option<&str>) -> Result<bool, ControllerError> {
        let status = match self.client().status().await {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!(%error, endpoint = %self.ctx.endpoint(), "endpoint status check failed");
                503
            }
        };
        let active = status == 200;
        self.ctx.set_endpoint_active(active);
        if !active {
            tracing::info!(status, endpoint = %self.ctx.endpoint(), "endpoint inactive");
            self.ctx.set_agents(Vec::new());
            return Ok(false);
        }

        let agents = self.client().agents().await?;
        tracing::debug!(count = agents.len(), "agents loaded");
        self.ctx.set_agents(agents);

        match preferred_agent {
            Some(agent_id) => {
                if !self.ctx.select_agent(agent_id) {
                    return Err(ControllerError::UnknownAgent(agent_id.to_string()));
                }
            }
            None if self.ctx.agent_id().is_none() => {
                if let Some(first) = self.ctx.agents().first().map(|agent| agent.agent_id.clone()) {
                    self.ctx.select_agent(&first);
                }
            }
            None => {}
        }
        Ok(true)
    }

    pub async fn load_sessions(&mut self) -> Result<(), ControllerError> {
        let agent_id = self.require_agent()?;
        let sessions = self.client().sessions(&agent_id).await?;
        self.ctx.set_sessions(sessions);
        Ok(())
    }

    /// Fetches a stored session and makes it the current conversation.
    pub async fn load_session(&mut self, session_id: &str) -> Result<Arc<Vec<Turn>>, ControllerError> {
        let agent_id = self.require_agent()?;
        let record = self.client().session(&agent_id, session_id).await?;
        let turns = reconstruct(&record, now_unix());
        self.ctx.load_transcript(session_id, turns);
        Ok(self.ctx.messages())
    }

    pub async fn delete_session(&mut self, session_id: &str) -> Result<(), ControllerError> {
        let agent_id = self.require_agent()?;
        self.client().delete_session(&agent_id, session_id).await?;
        self.ctx.remove_session(session_id);
        tracing::info!(session_id, "session deleted");
        Ok(())
    }

    pub async fn send<H>(&mut self, host: &mut H, message: &str) -> RunOutcome
    where
        H: ChatHost + ?Sized,
    {
        drive(&mut self.ctx, host, &self.transport, message).await
    }

    pub fn new_chat(&mut self) {
        self.ctx.clear_chat();
    }
}
