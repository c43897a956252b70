//! Configuration types for model analysis.

use crate::{identifiers::AgentId, utils::DEFAULT_TIE_TOLERANCE};

/// Configuration for generating and analyzing models.
///
/// # Examples
///
/// ```
/// use macid::app::AnalysisConfig;
///
/// let config = AnalysisConfig::new()
///     .with_seed(42)
///     .with_horizon(1)
///     .with_agent(1);
/// assert_eq!(config.agents.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Random seed for generated models
    pub seed: Option<u64>,
    /// Recall horizon; `None` checks every pair of decisions
    pub horizon: Option<usize>,
    /// Expected-utility gap under which two rules count as tied
    pub tie_tolerance: f64,
    /// Agents to report recall for; empty means every agent
    pub agents: Vec<AgentId>,
    /// Skip rule optimization for decisions with more rules than this
    pub max_rules: usize,
}

impl AnalysisConfig {
    /// Rule count above which [`crate::app::App::analyze`] skips a decision.
    pub const DEFAULT_MAX_RULES: usize = 4096;

    /// Create a configuration with default values:
    /// - Seed: None (non-deterministic)
    /// - Horizon: None
    /// - Tie tolerance: [`DEFAULT_TIE_TOLERANCE`]
    /// - Agents: all
    pub fn new() -> Self {
        Self {
            seed: None,
            horizon: None,
            tie_tolerance: DEFAULT_TIE_TOLERANCE,
            agents: Vec::new(),
            max_rules: Self::DEFAULT_MAX_RULES,
        }
    }

    /// Set the random seed for deterministic generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_tie_tolerance(mut self, tolerance: f64) -> Self {
        self.tie_tolerance = tolerance;
        self
    }

    /// Restrict recall checks to `agent`. May be called repeatedly.
    pub fn with_agent(mut self, agent: impl Into<AgentId>) -> Self {
        self.agents.push(agent.into());
        self
    }

    pub fn with_max_rules(mut self, max_rules: usize) -> Self {
        self.max_rules = max_rules;
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}
