//! Query command - Posterior marginals and expected values

use anyhow::Result;
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::{Imputation, ModelSource, parse_assignments},
        output::{print_kv, print_section, print_subsection},
    },
    types::format_assignment,
};

#[derive(Parser, Debug)]
#[command(about = "Compute posterior marginals of target variables")]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: ModelSource,

    /// Target variable (repeatable)
    #[arg(long = "target", short = 't', required = true)]
    pub targets: Vec<String>,

    /// Observed value as NODE=value (repeatable)
    #[arg(long = "evidence", short = 'e')]
    pub evidence: Vec<String>,

    /// Intervention as NODE=value (repeatable)
    #[arg(long = "intervene", short = 'i')]
    pub interventions: Vec<String>,

    /// Fill in decisions that have no policy before querying
    #[arg(long, value_enum, default_value_t = Imputation::None)]
    pub impute: Imputation,

    /// Random seed for --impute random
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: QueryArgs) -> Result<()> {
    let app = App::new();
    let mut model = args.source.load(&app)?;
    args.impute.apply(&mut model, args.seed)?;

    let evidence = parse_assignments(&model, &args.evidence)?;
    let intervention = parse_assignments(&model, &args.interventions)?;
    if !intervention.is_empty() {
        model.intervene(&intervention)?;
    }

    let distribution = model.query(&args.targets, &evidence)?;

    print_section(&format!("Query on {}", args.source.describe()));
    print_kv("Evidence", &display_or_none(&format_assignment(&evidence)));
    print_kv("Intervention", &display_or_none(&format_assignment(&intervention)));

    for target in &args.targets {
        print_subsection(&format!("P({target} | evidence)"));
        if let Some(marginal) = distribution.marginal(target) {
            for (value, probability) in marginal {
                println!("  {:>8}  {probability:.6}", value.to_string());
            }
        }
        if let Some(expectation) = distribution.expectation(target) {
            print_kv("Expected value", &format!("{expectation:.6}"));
        }
    }
    Ok(())
}

fn display_or_none(text: &str) -> String {
    if text.is_empty() || text == "{}" {
        "none".to_string()
    } else {
        text.to_string()
    }
}
