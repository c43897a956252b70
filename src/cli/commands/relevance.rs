//! Relevance command - Strategic relevance and sufficient recall

use anyhow::Result;
use clap::Parser;

use crate::{
    app::{AnalysisConfig, App},
    cli::{
        config::ModelSource,
        output::{create_spinner, join_or_dash, print_kv, print_section, print_subsection},
    },
};

#[derive(Parser, Debug)]
#[command(about = "Analyze strategic relevance between decisions")]
pub struct RelevanceArgs {
    #[command(flatten)]
    pub source: ModelSource,

    /// Only check recall between decisions this many positions apart
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Restrict recall checks to these agents
    #[arg(long = "agent")]
    pub agents: Vec<String>,

    /// Skip rule optimization for decisions with more rules than this
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_MAX_RULES)]
    pub max_rules: usize,
}

pub fn execute(args: RelevanceArgs) -> Result<()> {
    let app = App::new();
    let model = args.source.load(&app)?;

    let mut config = AnalysisConfig::new().with_max_rules(args.max_rules);
    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon);
    }
    for agent in args.agents {
        config = config.with_agent(agent);
    }
    let spinner = create_spinner("analyzing relevance and scoring decision rules");
    let report = app.analyze(&model, &config);
    spinner.finish_and_clear();
    let report = report?;

    print_section(&format!("Relevance of {}", args.source.describe()));
    print_kv("Acyclic", &report.relevance_acyclic.to_string());
    match &report.solving_order {
        Some(order) => print_kv("Solving order", &join_or_dash(order)),
        None => print_kv("Solving order", "none (cyclic)"),
    }

    print_subsection("Edges (D -> D' means D' relies on D)");
    if report.relevance_edges.is_empty() {
        println!("  none");
    }
    for (from, to) in &report.relevance_edges {
        println!("  {from} -> {to}");
    }

    print_subsection("Strongly connected components");
    for component in &report.components {
        println!("  {{{}}}", join_or_dash(component));
    }

    print_subsection("Sufficient recall");
    for (agent, ok) in &report.recall {
        print_kv(&format!("agent {agent}"), &ok.to_string());
    }

    print_subsection("Decision rules");
    for summary in &report.decisions {
        let best = match summary.best_expected_utility {
            Some(eu) => format!(
                "best EU {eu:.4}, {} optimal of {}",
                summary.optimal_rules.len(),
                summary.rule_count
            ),
            None => format!("{} rules, not scored", summary.rule_count),
        };
        print_kv(summary.decision.as_str(), &best);
    }
    Ok(())
}
