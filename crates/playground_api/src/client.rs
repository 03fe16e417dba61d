use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::{stream, Stream, StreamExt};
use playground_types::{Agent, RunRequest, RunResponse, SessionRecord, SessionSummary};
use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{parse_error_message, PlaygroundApiError};
use crate::json_stream::JsonStreamParser;
use crate::url::{
    agent_run_url, agents_url, construct_endpoint_url, session_url, sessions_url, status_url,
};

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

/// Lazily decoded run payloads in arrival order.
pub type RunStream = Pin<Box<dyn Stream<Item = Result<RunResponse, PlaygroundApiError>>>>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct PlaygroundClient {
    http: Client,
    config: ClientConfig,
    base_url: String,
}

impl PlaygroundClient {
    pub fn new(config: ClientConfig) -> Result<Self, PlaygroundApiError> {
        let base_url = construct_endpoint_url(&config.endpoint);
        url::Url::parse(&base_url)
            .map_err(|error| PlaygroundApiError::InvalidEndpoint(format!("{base_url}: {error}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let http = builder.build().map_err(PlaygroundApiError::from)?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Normalized base URL every route is built on.
    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// HTTP status of the playground status route.
    pub async fn status(&self) -> Result<u16, PlaygroundApiError> {
        let response = self.http.get(status_url(&self.base_url)).send().await?;
        Ok(response.status().as_u16())
    }

    pub async fn agents(&self) -> Result<Vec<Agent>, PlaygroundApiError> {
        let response = self.http.get(agents_url(&self.base_url)).send().await?;
        read_json(response).await
    }

    /// Session summaries for `agent_id`; empty when the agent has no storage.
    pub async fn sessions(&self, agent_id: &str) -> Result<Vec<SessionSummary>, PlaygroundApiError> {
        let response = self
            .http
            .get(sessions_url(&self.base_url, agent_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(agent_id, "session storage not enabled");
            return Ok(Vec::new());
        }
        read_json(response).await
    }

    pub async fn session(
        &self,
        agent_id: &str,
        session_id: &str,
    ) -> Result<SessionRecord, PlaygroundApiError> {
        let response = self
            .http
            .get(session_url(&self.base_url, agent_id, session_id))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn delete_session(
        &self,
        agent_id: &str,
        session_id: &str,
    ) -> Result<(), PlaygroundApiError> {
        let response = self
            .http
            .delete(session_url(&self.base_url, agent_id, session_id))
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }

    /// Multipart POST starting a run.
    pub fn build_run_request(&self, request: &RunRequest) -> reqwest::RequestBuilder {
        let form = request
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        self.http
            .post(agent_run_url(&self.base_url, &request.agent_id))
            .multipart(form)
    }

    /// Starts a run and returns its payload stream.
    ///
    /// A non-success status fails here with the server's message. Once the
    /// stream is returned, cancellation ends it without an error item.
    pub async fn stream_run(
        &self,
        request: &RunRequest,
        cancellation: Option<CancellationSignal>,
    ) -> Result<RunStream, PlaygroundApiError> {
        let send = self.build_run_request(request).send();
        let response = await_or_cancel(send, cancellation.as_ref()).await??;
        let response = ensure_success(response).await?;
        Ok(run_stream(Box::pin(response.bytes_stream()), cancellation))
    }
}

/// Adapts a raw byte stream into decoded run payloads.
pub fn run_stream<S, B>(bytes: S, cancellation: Option<CancellationSignal>) -> RunStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin + 'static,
    B: AsRef<[u8]> + 'static,
{
    let state = RunStreamState {
        bytes,
        parser: JsonStreamParser::default(),
        pending: VecDeque::new(),
        cancellation,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(response) = state.pending.pop_front() {
                return Some((Ok(response), state));
            }
            if state.finished || is_cancelled(state.cancellation.as_ref()) {
                return None;
            }

            let next = match await_or_cancel(state.bytes.next(), state.cancellation.as_ref()).await
            {
                Ok(next) => next,
                Err(_) => {
                    tracing::debug!("run stream cancelled");
                    return None;
                }
            };
            match next {
                Some(Ok(chunk)) => state.pending.extend(state.parser.feed(chunk.as_ref())),
                Some(Err(error)) => {
                    state.finished = true;
                    tracing::warn!(%error, "run stream failed");
                    return Some((Err(PlaygroundApiError::from(error)), state));
                }
                None => {
                    if !state.parser.is_empty_buffer() {
                        tracing::warn!("run stream ended inside a payload");
                    }
                    state.finished = true;
                }
            }
        }
    }))
}

struct RunStreamState<S> {
    bytes: S,
    parser: JsonStreamParser,
    pending: VecDeque<RunResponse>,
    cancellation: Option<CancellationSignal>,
    finished: bool,
}

async fn ensure_success(response: Response) -> Result<Response, PlaygroundApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(status, &body);
    tracing::warn!(status = status.as_u16(), %message, "playground request failed");
    Err(PlaygroundApiError::Status { status, message })
}

async fn read_json<T>(response: Response) -> Result<T, PlaygroundApiError>
where
    T: DeserializeOwned,
{
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(PlaygroundApiError::from)
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, PlaygroundApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(PlaygroundApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(PlaygroundApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
