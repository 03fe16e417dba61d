//! Drives one run from request to finalization.

use std::fmt::Display;
use std::future::Future;
use std::pin::pin;

use futures_util::{Stream, StreamExt};
use playground_types::{RunRequest, RunResponse};

use crate::context::{now_unix, ChatContext, ChatHost};
use crate::fragment::decode;
use crate::reducer::{RunState, StreamReducer};

/// Source of decoded run fragments.
///
/// The returned stream yields fragments in arrival order. An `Err` item is a
/// transport failure and ends the run.
pub trait RunTransport {
    type Error: Display;
    type Stream: Stream<Item = Result<RunResponse, Self::Error>>;

    fn open_run(
        &self,
        request: RunRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No agent was selected; nothing was appended.
    NotStarted,
    Completed,
    Failed { message: String },
    /// The stream ended before a terminal fragment.
    Interrupted,
}

/// Submits `message` to the selected agent and folds the streamed fragments
/// into `ctx`, publishing after every fragment.
pub async fn drive<T, H>(
    ctx: &mut ChatContext,
    host: &mut H,
    transport: &T,
    message: &str,
) -> RunOutcome
where
    T: RunTransport + ?Sized,
    H: ChatHost + ?Sized,
{
    let Some(agent_id) = ctx.agent_id().map(ToString::to_string) else {
        tracing::debug!("no agent selected, run not started");
        return RunOutcome::NotStarted;
    };

    let request = RunRequest::streaming(agent_id, message, ctx.session_id());
    tracing::info!(agent_id = %request.agent_id, session_id = %request.session_id, "starting run");

    let mut reducer = StreamReducer::begin(ctx, message, now_unix());
    host.publish(&ctx.snapshot());

    match transport.open_run(request).await {
        Ok(stream) => {
            let mut stream = pin!(stream);
            while let Some(item) = stream.next().await {
                match item {
                    Ok(response) => {
                        reducer.apply(ctx, decode(response));
                    }
                    Err(error) => reducer.fail(ctx, error.to_string()),
                }
                host.publish(&ctx.snapshot());

                if reducer.state().is_terminal() {
                    break;
                }
            }
        }
        Err(error) => {
            reducer.fail(ctx, error.to_string());
        }
    }

    reducer.finish(ctx);
    host.focus_input();
    host.publish(&ctx.snapshot());

    let outcome = match reducer.state() {
        RunState::Completed => RunOutcome::Completed,
        RunState::Errored => RunOutcome::Failed {
            message: ctx.streaming_error_message().unwrap_or_default().to_string(),
        },
        RunState::Idle | RunState::Started | RunState::Streaming => RunOutcome::Interrupted,
    };
    tracing::info!(outcome = ?outcome, "run finished");
    outcome
}
