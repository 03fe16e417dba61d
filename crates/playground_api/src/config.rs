use std::time::Duration;

use crate::url::DEFAULT_PLAYGROUND_ENDPOINT;

/// Transport configuration for playground requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint as entered by the user; normalized by the client.
    pub endpoint: String,
    /// Optional request timeout. Streaming runs are bounded by it as a whole.
    pub timeout: Option<Duration>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PLAYGROUND_ENDPOINT.to_string(),
            timeout: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
