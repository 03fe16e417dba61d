//! Transcript reconciliation for streaming agent playground runs.
//!
//! Invariant: only the tail agent turn of the run in flight is ever mutated;
//! every other turn is immutable once published.
//!
//! # Public API Overview
//! - Decode wire payloads once into typed fragments with [`fragment::decode`].
//! - Fold fragments into a [`ChatContext`] with [`StreamReducer`], or let
//!   [`drive`] pull them from a [`RunTransport`].
//! - Merge tool invocations by identity with [`tools::reconcile`].
//! - Rebuild a transcript from a stored session with [`history::reconstruct`].

pub mod content;
pub mod context;
pub mod fragment;
pub mod history;
pub mod media;
pub mod reducer;
pub mod run;
pub mod sessions;
pub mod tools;
pub mod transcript;

pub use crate::context::{now_unix, ChatContext, ChatHost, ChatSnapshot, NoopHost};
pub use crate::fragment::{decode, ContentBody, Fragment};
pub use crate::history::reconstruct;
pub use crate::reducer::{RunState, StreamReducer};
pub use crate::run::{drive, RunOutcome, RunTransport};
pub use crate::transcript::{AgentTurn, Role, Turn, UserTurn};
