//! Transport-only client for agent playground servers.
//!
//! This crate owns endpoint normalization, the playground route table, the
//! HTTP calls, and deframing of streamed run payloads. It contains no
//! transcript logic; decoded payloads are handed to callers as
//! [`playground_types::RunResponse`] values.

pub mod client;
pub mod config;
pub mod error;
pub mod json_stream;
pub mod url;

pub use client::{run_stream, CancellationSignal, PlaygroundClient, RunStream};
pub use config::ClientConfig;
pub use error::PlaygroundApiError;
pub use json_stream::JsonStreamParser;
pub use url::{construct_endpoint_url, DEFAULT_PLAYGROUND_ENDPOINT};
