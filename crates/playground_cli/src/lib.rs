//! Command-line front end for agent playground servers.

pub mod cli;
pub mod config;
pub mod controller;
pub mod output;
pub mod transport;

pub use config::{CliConfig, ConfigError, ConfigOverrides};
pub use controller::{ControllerError, SessionController};
pub use output::TerminalHost;
pub use transport::ApiTransport;
