use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::stream;
use playground_api::{CancellationSignal, PlaygroundApiError, PlaygroundClient, RunStream};
use playground_chat::RunTransport;
use playground_types::RunRequest;

/// [`RunTransport`] backed by a playground HTTP client.
///
/// Raising the cancellation signal ends the current run quietly. The signal
/// is lowered again when the next run opens.
#[derive(Debug, Clone)]
pub struct ApiTransport {
    client: PlaygroundClient,
    cancellation: CancellationSignal,
}

impl ApiTransport {
    #[must_use]
    pub fn new(client: PlaygroundClient) -> Self {
        Self {
            client,
            cancellation: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn client(&self) -> &PlaygroundClient {
        &self.client
    }

    #[must_use]
    pub fn cancellation(&self) -> CancellationSignal {
        Arc::clone(&self.cancellation)
    }

    pub fn cancel(&self) {
        self.cancellation.store(true, Ordering::SeqCst);
    }
}

impl RunTransport for ApiTransport {
    type Error = PlaygroundApiError;
    type Stream = RunStream;

    fn open_run(
        &self,
        request: RunRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> {
        self.cancellation.store(false, Ordering::SeqCst);
        let cancellation = self.cancellation();
        async move {
            match self.client.stream_run(&request, Some(cancellation)).await {
                Err(PlaygroundApiError::Cancelled) => {
                    tracing::debug!("run cancelled before the stream opened");
                    let empty: RunStream = Box::pin(stream::empty());
                    Ok(empty)
                }
                other => other,
            }
        }
    }
}
