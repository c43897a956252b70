//! Inspect command - Summarize nodes, ownership and CPD status

use anyhow::Result;
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::ModelSource,
        output::{join_or_dash, print_kv, print_section, print_subsection},
    },
};

#[derive(Parser, Debug)]
#[command(about = "Show the structure of a model")]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: ModelSource,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let app = App::new();
    let model = args.source.load(&app)?;

    print_section(&format!("Model {}", args.source.describe()));
    print_kv("Nodes", &model.node_count().to_string());
    print_kv("Edges", &model.dag().edge_count().to_string());
    print_kv("Agents", &join_or_dash(&model.agents().into_iter().collect::<Vec<_>>()));
    print_kv("Decisions", &join_or_dash(&model.decisions()));
    print_kv("Utilities", &join_or_dash(&model.utilities()));

    print_subsection("Nodes");
    for id in model.dag().topological_order() {
        let Some(node) = model.node(id.as_str()) else {
            continue;
        };
        let owner = node
            .agent()
            .map(|agent| format!(" (agent {agent})"))
            .unwrap_or_default();
        let cpd = if model.has_cpd(id.as_str()) {
            "cpd"
        } else {
            "no cpd"
        };
        println!(
            "  {:12} {:9}{owner} domain [{}] parents [{}] {cpd}",
            id.as_str(),
            node.kind().as_str(),
            join_or_dash(node.domain()),
            join_or_dash(&model.parents(id.as_str())),
        );
    }

    print_subsection("Validation");
    match model.check_model() {
        Ok(()) => println!("  model is complete and consistent"),
        Err(err) => println!("  incomplete: {err}"),
    }
    Ok(())
}
