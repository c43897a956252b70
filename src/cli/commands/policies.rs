//! Policies command - Score every decision rule of one decision

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    app::App,
    cli::{
        config::ModelSource,
        output::{create_rule_progress, format_number, print_kv, print_section, print_subsection},
    },
    export::{RuleCsvExporter, describe_rule},
    policy::{RuleEvaluation, optimal_indices},
    utils::DEFAULT_TIE_TOLERANCE,
};

#[derive(Parser, Debug)]
#[command(about = "Enumerate and score the decision rules of a decision")]
pub struct PoliciesArgs {
    #[command(flatten)]
    pub source: ModelSource,

    /// Decision node to optimize
    #[arg(long, short = 'd')]
    pub decision: String,

    /// Expected-utility gap under which rules count as tied
    #[arg(long, default_value_t = DEFAULT_TIE_TOLERANCE)]
    pub tolerance: f64,

    /// Write every evaluation to a CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: PoliciesArgs) -> Result<()> {
    let app = App::new();
    let model = args.source.load(&app)?;

    let rules = model.possible_decision_rules(&args.decision)?;
    let mut scorer = model.rule_scorer(&args.decision)?;
    let total = rules.len();

    print_section(&format!("Decision rules for {}", args.decision));
    print_kv("Model", &args.source.describe());
    print_kv("Agent", scorer.agent().as_str());
    print_kv("Rules", &format_number(total));

    let progress = create_rule_progress(total as u64);
    let mut evaluations = Vec::with_capacity(total);
    for (index, rule) in rules.enumerate() {
        let expected_utility = scorer.score(&rule)?;
        evaluations.push(RuleEvaluation {
            index,
            rule,
            expected_utility,
        });
        progress.inc(1);
    }
    progress.finish_with_message("scored");

    let optimal = optimal_indices(&evaluations, args.tolerance);
    print_subsection(&format!("Optimal rules ({})", optimal.len()));
    for &position in &optimal {
        let evaluation = &evaluations[position];
        println!(
            "  #{:<6} EU {:>10.6}  {}",
            evaluation.index,
            evaluation.expected_utility,
            describe_rule(&model, &evaluation.rule)?
        );
    }

    if let Some(path) = args.export {
        let written = RuleCsvExporter::export(&model, &evaluations, args.tolerance, &path)
            .with_context(|| format!("failed to export rules to {}", path.display()))?;
        info!(rows = written, path = %path.display(), "exported decision rules");
        println!("\nExported {} rules to {}", format_number(written), path.display());
    }
    Ok(())
}
