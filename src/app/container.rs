//! Dependency injection container for the analysis toolkit.
//!
//! The container owns the persistence adapter and the default seed and offers
//! the use cases the CLI is built from.

use std::{path::Path, sync::Arc};

use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, warn};

use super::config::AnalysisConfig;
use crate::{
    Result,
    adapters::ExtensionRepository,
    analysis::RelevanceGraph,
    error::Error,
    identifiers::{AgentId, NodeId},
    model::Macid,
    policy::{RuleEvaluation, optimal_indices},
    ports::ModelRepository,
    random,
};

/// Optimal rules found for one decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionSummary {
    pub decision: NodeId,
    pub rule_count: usize,
    /// `None` when the rule count exceeded [`AnalysisConfig::max_rules`]
    pub best_expected_utility: Option<f64>,
    /// Enumeration indices of the tied optimal rules
    pub optimal_rules: Vec<usize>,
}

/// Strategic structure of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub relevance_edges: Vec<(NodeId, NodeId)>,
    pub relevance_acyclic: bool,
    pub components: Vec<Vec<NodeId>>,
    /// Solving order, available when the relevance graph is acyclic
    pub solving_order: Option<Vec<NodeId>>,
    pub recall: Vec<(AgentId, bool)>,
    pub decisions: Vec<DecisionSummary>,
}

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use macid::app::{App, AnalysisConfig};
///
/// let app = App::new();
/// let model = app.generate_model(6, 1, 1, &AnalysisConfig::new().with_seed(42))?;
/// let report = app.analyze(&model, &AnalysisConfig::new())?;
/// assert!(report.relevance_acyclic);
/// # Ok::<(), macid::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use macid::app::App;
/// use macid::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    repository: Arc<dyn ModelRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `ExtensionRepository` (format chosen by file extension)
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            repository: Arc::new(ExtensionRepository),
            default_seed: None,
        }
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Returns an Arc-wrapped repository that can be shared across threads.
    pub fn repository(&self) -> Arc<dyn ModelRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    pub fn load_model(&self, path: &Path) -> Result<Macid> {
        self.repository.load(path)
    }

    pub fn save_model(&self, model: &Macid, path: &Path) -> Result<()> {
        self.repository.save(model, path)
    }

    /// Generate a random single-agent CID.
    ///
    /// The seed comes from `config`, falling back to the container default
    /// and then to OS entropy.
    pub fn generate_model(
        &self,
        n_all: usize,
        n_decisions: usize,
        n_utilities: usize,
        config: &AnalysisConfig,
    ) -> Result<Macid> {
        let mut rng = match config.seed.or(self.default_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        random::random_cid(n_all, n_decisions, n_utilities, &mut rng)
    }

    /// Relevance structure, recall per agent and optimal rules per decision.
    ///
    /// Decisions with more than [`AnalysisConfig::max_rules`] rules are
    /// listed without scores.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAgent`] if `config` names an agent the model lacks,
    /// [`Error::HorizonOutOfRange`] for an oversized horizon, and inference
    /// errors from incomplete models.
    pub fn analyze(&self, model: &Macid, config: &AnalysisConfig) -> Result<AnalysisReport> {
        let relevance = RelevanceGraph::new(model)?;

        let agents: Vec<AgentId> = if config.agents.is_empty() {
            model.agents().into_iter().collect()
        } else {
            config.agents.clone()
        };
        let recall = agents
            .into_iter()
            .map(|agent| {
                let ok = model.sufficient_recall(agent.clone(), config.horizon)?;
                Ok((agent, ok))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut decisions = Vec::new();
        for decision in model.decisions() {
            decisions.push(summarize_decision(model, &decision, config)?);
        }

        debug!(
            decisions = decisions.len(),
            acyclic = relevance.is_acyclic(),
            "analyzed model"
        );
        Ok(AnalysisReport {
            relevance_edges: relevance.edges(),
            relevance_acyclic: relevance.is_acyclic(),
            components: relevance.strongly_connected_components(),
            solving_order: relevance.topological_order(),
            recall,
            decisions,
        })
    }
}

fn summarize_decision(
    model: &Macid,
    decision: &NodeId,
    config: &AnalysisConfig,
) -> Result<DecisionSummary> {
    let rule_count = match model.possible_decision_rules(decision.as_str()) {
        Ok(rules) => rules.len(),
        Err(Error::PolicySpaceTooLarge { .. }) => usize::MAX,
        Err(err) => return Err(err),
    };
    if rule_count > config.max_rules {
        warn!(decision = %decision, rule_count, "skipping rule optimization");
        return Ok(DecisionSummary {
            decision: decision.clone(),
            rule_count,
            best_expected_utility: None,
            optimal_rules: Vec::new(),
        });
    }

    let evaluations: Vec<RuleEvaluation> =
        model.evaluate_decision_rules(decision.as_str())?;
    let optimal_rules = optimal_indices(&evaluations, config.tie_tolerance);
    let best_expected_utility = optimal_rules
        .first()
        .map(|&index| evaluations[index].expected_utility);
    Ok(DecisionSummary {
        decision: decision.clone(),
        rule_count,
        best_expected_utility,
        optimal_rules,
    })
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    repository: Option<Arc<dyn ModelRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    /// Set a custom model repository.
    pub fn with_repository<R: ModelRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for every generated model.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// If no repository was specified, uses `ExtensionRepository`.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(ExtensionRepository)),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InMemoryRepository, catalog};

    #[test]
    fn test_app_default_seed_is_reproducible() {
        let app = App::for_testing().with_default_seed(42).build();
        let config = AnalysisConfig::new();
        let first = app.generate_model(8, 2, 2, &config).unwrap();
        let second = app.generate_model(8, 2, 2, &config).unwrap();
        assert_eq!(first.to_spec(), second.to_spec());
    }

    #[test]
    fn test_config_seed_overrides_app_default() {
        let app = App::for_testing().with_default_seed(42).build();
        let a = app
            .generate_model(10, 2, 2, &AnalysisConfig::new().with_seed(1))
            .unwrap();
        let b = App::for_testing()
            .with_default_seed(1)
            .build()
            .generate_model(10, 2, 2, &AnalysisConfig::new())
            .unwrap();
        assert_eq!(a.to_spec(), b.to_spec());
    }

    #[test]
    fn test_app_round_trips_through_injected_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing().with_repository(repo.clone()).build();
        let model = catalog::five_node_cid().unwrap();
        app.save_model(&model, Path::new("five")).unwrap();
        assert_eq!(repo.count(), 1);
        let loaded = app.load_model(Path::new("five")).unwrap();
        assert_eq!(loaded.decisions(), model.decisions());
    }

    #[test]
    fn test_analyze_five_node_cid() {
        let app = App::new();
        let model = catalog::five_node_cid().unwrap();
        let report = app.analyze(&model, &AnalysisConfig::new()).unwrap();
        assert!(report.relevance_acyclic);
        assert_eq!(report.recall, vec![(AgentId::from(1), true)]);
        let summary = &report.decisions[0];
        assert_eq!(summary.rule_count, 16);
        assert_eq!(summary.optimal_rules.len(), 4);
        assert!((summary.best_expected_utility.unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_reports_cycles_and_skips_large_decisions() {
        let app = App::new();
        let model = catalog::basic_two_agent_cyclic().unwrap();
        let config = AnalysisConfig::new().with_max_rules(1);
        let report = app.analyze(&model, &config).unwrap();
        assert!(!report.relevance_acyclic);
        assert!(report.solving_order.is_none());
        assert_eq!(report.components.len(), 1);
        assert!(report
            .decisions
            .iter()
            .all(|summary| summary.best_expected_utility.is_none()));
    }

    #[test]
    fn test_analyze_rejects_unknown_agent() {
        let app = App::new();
        let model = catalog::basic_two_agent_acyclic().unwrap();
        let config = AnalysisConfig::new().with_agent(3);
        assert!(matches!(
            app.analyze(&model, &config),
            Err(Error::UnknownAgent { .. })
        ));
    }
}
