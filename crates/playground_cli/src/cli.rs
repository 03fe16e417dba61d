use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(name = "playground", version, about = "Chat with agents served by a playground endpoint")]
pub struct Args {
    /// JSON config file (overrides PLAYGROUND_CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Playground endpoint, e.g. localhost:7777
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Agent to talk to; defaults to the first agent listed
    #[arg(long, global = true)]
    pub agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_sec: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether the endpoint is reachable
    Status,
    /// List available agents
    Agents,
    /// List stored sessions of the selected agent
    Sessions,
    /// Print a stored session
    Show { session_id: String },
    /// Delete a stored session
    Delete { session_id: String },
    /// Send one message and stream the reply
    Run {
        message: String,
        /// Continue an existing session
        #[arg(long)]
        session: Option<String>,
    },
    /// Interactive chat; `/new` starts a new chat, `/quit` exits
    Chat,
}

impl Args {
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            endpoint: self.endpoint.clone(),
            agent_id: self.agent.clone(),
            timeout_sec: self.timeout_sec,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, Command};

    #[test]
    fn run_accepts_session_and_global_flags() {
        let args = Args::try_parse_from([
            "playground",
            "run",
            "hello there",
            "--session",
            "s-1",
            "--agent",
            "finance",
        ])
        .expect("args");

        assert_eq!(args.agent.as_deref(), Some("finance"));
        match args.command {
            Command::Run { message, session } => {
                assert_eq!(message, "hello there");
                assert_eq!(session.as_deref(), Some("s-1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_session_id() {
        assert!(Args::try_parse_from(["playground", "show"]).is_err());
    }
}
