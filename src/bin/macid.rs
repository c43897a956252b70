//! MACID CLI - analysis toolkit for multi-agent causal influence diagrams
//!
//! This CLI provides a unified interface for:
//! - Inspecting model structure
//! - Strategic relevance and sufficient recall analysis
//! - Enumerating and optimizing decision rules
//! - Exact probabilistic queries with evidence and interventions
//! - Writing catalog and random models

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "macid")]
#[command(version, about = "Analysis toolkit for multi-agent causal influence diagrams", long_about = None)]
struct Cli {
    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show nodes, ownership, domains and CPD status
    Inspect(macid::cli::commands::inspect::InspectArgs),

    /// Relevance graph, solving order and sufficient recall
    Relevance(macid::cli::commands::relevance::RelevanceArgs),

    /// Score every decision rule of a decision
    Policies(macid::cli::commands::policies::PoliciesArgs),

    /// Posterior marginals under evidence and interventions
    Query(macid::cli::commands::query::QueryArgs),

    /// Write a random CID
    Generate(macid::cli::commands::generate::GenerateArgs),

    /// List or write built-in example models
    Catalog(macid::cli::commands::catalog::CatalogArgs),
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Inspect(args) => macid::cli::commands::inspect::execute(args),
        Commands::Relevance(args) => macid::cli::commands::relevance::execute(args),
        Commands::Policies(args) => macid::cli::commands::policies::execute(args),
        Commands::Query(args) => macid::cli::commands::query::execute(args),
        Commands::Generate(args) => macid::cli::commands::generate::execute(args),
        Commands::Catalog(args) => macid::cli::commands::catalog::execute(args),
    }
}
