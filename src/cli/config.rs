//! Shared argument types for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    app::App,
    catalog,
    model::Macid,
    types::{Assignment, Value},
};

/// Where a command reads its model from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ModelSource {
    /// Model file (.json or .msgpack)
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Built-in example model
    #[arg(long, short = 'c')]
    pub catalog: Option<String>,
}

impl ModelSource {
    pub fn load(&self, app: &App) -> Result<Macid> {
        match (&self.model, &self.catalog) {
            (Some(path), _) => app
                .load_model(path)
                .with_context(|| format!("failed to load model from {}", path.display())),
            (None, Some(name)) => Ok(catalog::by_name(name)?),
            (None, None) => bail!("either --model or --catalog is required"),
        }
    }

    /// Label used in command headers.
    pub fn describe(&self) -> String {
        match (&self.model, &self.catalog) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(name)) => format!("catalog:{name}"),
            (None, None) => "<none>".to_string(),
        }
    }
}

/// How decisions without a policy are filled in before querying
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Imputation {
    /// Leave them unassigned
    #[default]
    None,
    /// Fully mixed policy
    Uniform,
    /// Random deterministic rule (see --seed)
    Random,
    /// Optimal rule, solving decisions last to first
    Optimal,
}

impl Imputation {
    pub fn apply(self, model: &mut Macid, seed: Option<u64>) -> Result<()> {
        match self {
            Imputation::None => {}
            Imputation::Uniform => model.impute_uniform_policy()?,
            Imputation::Random => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                model.impute_random_policy(&mut rng)?;
            }
            Imputation::Optimal => model.impute_optimal_policy()?,
        }
        Ok(())
    }
}

/// Parse `NODE=value` pairs, matching values against each node's domain.
pub fn parse_assignments(model: &Macid, pairs: &[String]) -> Result<Assignment> {
    let mut assignment = Assignment::new();
    for pair in pairs {
        let Some((node, raw)) = pair.split_once('=') else {
            bail!("expected NODE=value, got '{pair}'");
        };
        let node = node.trim();
        let domain = model
            .domain(node)
            .with_context(|| format!("in assignment '{pair}'"))?;
        let value = domain
            .iter()
            .find(|value| value.to_string() == raw.trim())
            .cloned()
            .unwrap_or_else(|| Value::from(raw.trim()));
        assignment.insert(node.into(), value);
    }
    Ok(assignment)
}
