//! Kappa CLI entry point.

mod cli;
mod state;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    kappa_observe::tracing_setup::init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Completions need no state.
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "kappa", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    kappa_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.config.clone())
        .await
        .context("Failed to initialize Kappa")?;
    tracing::debug!(data_dir = %state.data_dir.display(), "state initialized");

    match cli.command {
        Commands::Ingest {
            namespace,
            ingestor,
            payload,
        } => cli::memory::ingest(&state, &namespace, &ingestor, &payload, cli.json).await,
        Commands::Retrieve {
            namespace,
            query,
            n_results,
        } => cli::memory::retrieve(&state, &namespace, &query, n_results, cli.json).await,
        Commands::Lookup {
            namespace,
            node_id,
            depth,
        } => cli::memory::lookup(&state, &namespace, &node_id, depth, cli.json).await,
        Commands::Ingestors { namespace } => {
            cli::ingestor::list_ingestors(&state, &namespace, cli.json)
        }
        Commands::Tools { namespace } => cli::ingestor::list_tools(&state, &namespace, cli.json),
        Commands::Status => cli::status::status(&state, cli.json).await,
        Commands::Completions { .. } => Ok(()),
    }
}
