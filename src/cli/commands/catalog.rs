//! Catalog command - Write or list built-in example models

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{app::App, catalog};

#[derive(Parser, Debug)]
#[command(about = "Write a built-in example model to a file")]
pub struct CatalogArgs {
    /// Model name; omit to list the available models
    pub name: Option<String>,

    /// Output file (.json or .msgpack)
    #[arg(long, short = 'o', requires = "name")]
    pub output: Option<PathBuf>,
}

pub fn execute(args: CatalogArgs) -> Result<()> {
    let Some(name) = args.name else {
        for name in catalog::MODEL_NAMES {
            println!("{name}");
        }
        return Ok(());
    };

    let model = catalog::by_name(&name)?;
    match args.output {
        Some(path) => {
            App::new()
                .save_model(&model, &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {name} to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&model.to_spec())?),
    }
    Ok(())
}
