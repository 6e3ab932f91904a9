//! CLI command definitions for the `kappa` binary.
//!
//! Uses clap derive macros for argument parsing. Every memory command takes
//! the namespace as its first positional argument.

pub mod ingestor;
pub mod memory;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Hybrid vector-graph memory for agents.
#[derive(Parser)]
#[command(name = "kappa", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors; command results still print.
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file to use instead of `{data_dir}/kappa.toml`.
    #[arg(long, global = true, env = "KAPPA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default tracing directive for the chosen verbosity; `RUST_LOG` wins.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,kappa_core=debug,kappa_infra=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remember a JSON payload using one of the namespace's ingestors.
    Ingest {
        /// Memory namespace.
        namespace: String,

        /// Ingestor recipe to apply.
        ingestor: String,

        /// JSON object, or `@path` to read it from a file.
        payload: String,
    },

    /// Find the memories closest to a task description.
    #[command(alias = "search")]
    Retrieve {
        /// Memory namespace.
        namespace: String,

        /// Task description to match against.
        query: String,

        /// Number of matches (defaults to `default_n_results`).
        #[arg(short = 'n', long)]
        n_results: Option<usize>,
    },

    /// Show a graph node and its neighbors.
    Lookup {
        /// Memory namespace.
        namespace: String,

        /// Graph node id.
        node_id: String,

        /// Hops of neighbor expansion.
        #[arg(long, default_value_t = 0)]
        depth: usize,
    },

    /// List the ingestors defined for a namespace.
    Ingestors {
        /// Memory namespace.
        namespace: String,
    },

    /// Print the agent tool definitions for a namespace.
    Tools {
        /// Memory namespace.
        namespace: String,
    },

    /// Data directory, backends and per-namespace counts.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
