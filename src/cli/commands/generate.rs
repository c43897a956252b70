//! Generate command - Write a random single-agent CID

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{AnalysisConfig, App},
    cli::output::{print_kv, print_section},
};

#[derive(Parser, Debug)]
#[command(about = "Generate a random CID")]
pub struct GenerateArgs {
    /// Total number of nodes
    #[arg(long, short = 'n', default_value_t = 8)]
    pub nodes: usize,

    /// Number of decision nodes
    #[arg(long, short = 'd', default_value_t = 2)]
    pub decisions: usize,

    /// Number of utility nodes
    #[arg(long, short = 'u', default_value_t = 2)]
    pub utilities: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file (.json or .msgpack)
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let app = App::new();
    let mut config = AnalysisConfig::new();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let model = app.generate_model(args.nodes, args.decisions, args.utilities, &config)?;
    app.save_model(&model, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    print_section("Generated CID");
    print_kv("Nodes", &model.node_count().to_string());
    print_kv("Edges", &model.dag().edge_count().to_string());
    print_kv("Output", &args.output.display().to_string());
    Ok(())
}
