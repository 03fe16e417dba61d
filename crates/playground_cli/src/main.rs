use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use playground_api::PlaygroundClient;
use playground_chat::RunOutcome;
use playground_cli::cli::{Args, Command};
use playground_cli::output::{write_agents, write_sessions, write_transcript};
use playground_cli::{CliConfig, SessionController, TerminalHost};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = CliConfig::resolve(&args.overrides())?;
    let client = PlaygroundClient::new(config.client_config())?;

    if let Command::Status = args.command {
        let status = client.status().await.context("status check failed")?;
        let active = status == 200;
        println!(
            "{} {} (HTTP {status})",
            client.endpoint(),
            if active { "active" } else { "inactive" }
        );
        return Ok(if active {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut controller = SessionController::new(client);
    if !controller.initialize(config.agent_id.as_deref()).await? {
        anyhow::bail!("endpoint {} is not active", controller.context().endpoint());
    }

    let mut stdout = io::stdout().lock();
    match args.command {
        Command::Status => {}
        Command::Agents => {
            let ctx = controller.context();
            write_agents(&mut stdout, ctx.agents(), ctx.agent_id())?;
        }
        Command::Sessions => {
            controller.load_sessions().await?;
            write_sessions(&mut stdout, &controller.context().sessions())?;
        }
        Command::Show { session_id } => {
            let turns = controller.load_session(&session_id).await?;
            write_transcript(&mut stdout, &turns)?;
        }
        Command::Delete { session_id } => {
            controller.load_sessions().await?;
            controller.delete_session(&session_id).await?;
            writeln!(stdout, "deleted {session_id}")?;
        }
        Command::Run { message, session } => {
            drop(stdout);
            if let Some(session_id) = session {
                controller.load_session(&session_id).await?;
            }
            spawn_interrupt_watcher(&controller);
            let outcome = controller.send(&mut TerminalHost::stdio(), &message).await;
            return Ok(exit_code(&outcome));
        }
        Command::Chat => {
            drop(stdout);
            spawn_interrupt_watcher(&controller);
            chat(&mut controller).await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn chat(controller: &mut SessionController) -> anyhow::Result<()> {
    let mut host = TerminalHost::stdio();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let message = line.trim();
        match message {
            "" => continue,
            "/quit" => return Ok(()),
            "/new" => {
                controller.new_chat();
                eprintln!("new chat");
            }
            _ => {
                if let RunOutcome::NotStarted = controller.send(&mut host, message).await {
                    eprintln!("no agent selected");
                }
            }
        }
    }
}

/// Ctrl-C ends the current run instead of the process.
fn spawn_interrupt_watcher(controller: &SessionController) {
    let cancellation = controller.transport().cancellation();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            cancellation.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });
}

fn exit_code(outcome: &RunOutcome) -> ExitCode {
    match outcome {
        RunOutcome::Completed | RunOutcome::Interrupted => ExitCode::SUCCESS,
        RunOutcome::NotStarted | RunOutcome::Failed { .. } => ExitCode::FAILURE,
    }
}
