//! `agentflow`: list, inspect, create, delete and run workflows.

mod error;
mod render;

use agentflow_client::{
    ClientConfig, EditorSession, ExecutionOrchestrator, HttpWorkflowService, PersistenceAdapter,
    RunState,
};
use agentflow_core::WorkflowId;
use agentflow_workflow::NodeRegistry;
use clap::{Parser, Subcommand};
use error::CliError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "agentflow", about = "Build and run agent workflows", version)]
struct Cli {
    /// TOML configuration file; `AGENTFLOW__*` environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List saved workflows
    List,
    /// Show a workflow's nodes, edges and readiness
    Show { id: WorkflowId },
    /// Create an empty workflow
    New {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a workflow
    Delete { id: WorkflowId },
    /// Save and execute a workflow with the given input
    Run { id: WorkflowId, input: String },
    /// List the node kinds available to workflows
    Palette,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            let error = report.current_context();
            tracing::error!(error = %error, "command failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> agentflow_core::Result<(), CliError> {
    if matches!(cli.command, Command::Palette) {
        print!("{}", render::palette(NodeRegistry::global()));
        return Ok(());
    }

    let config = ClientConfig::load(cli.config.as_deref()).map_err(|e| CliError::Config {
        details: e.to_string(),
    })?;
    tracing::debug!(base_url = %config.base_url, "loaded configuration");

    let service = HttpWorkflowService::new(&config).map_err(CliError::from)?;
    let mut session = EditorSession::new(
        PersistenceAdapter::new(service),
        ExecutionOrchestrator::new(config.execute_timeout()),
    );

    match cli.command {
        Command::List => {
            let summaries = session.adapter().list().await.map_err(CliError::from)?;
            print!("{}", render::summaries(&summaries));
        }
        Command::Show { id } => {
            session.open(&id).await.map_err(CliError::from)?;
            print!(
                "{}",
                render::workflow(session.document(), &session.store().snapshot())
            );
        }
        Command::New { title, description } => {
            let id = session
                .new_workflow(&title, description.as_deref())
                .await
                .map_err(CliError::from)?;
            println!("{id}");
        }
        Command::Delete { id } => {
            session.open(&id).await.map_err(CliError::from)?;
            session.delete().await.map_err(CliError::from)?;
            println!("deleted {id}");
        }
        Command::Run { id, input } => {
            session.open(&id).await.map_err(CliError::from)?;
            match session.run(&input).await {
                RunState::Completed { content } => println!("{content}"),
                RunState::Failed(failure) => return Err(CliError::Run(failure).into()),
                other => tracing::warn!(state = other.as_str(), "run ended without result"),
            }
        }
        Command::Palette => {}
    }
    Ok(())
}
