//! Sufficient recall.
//!
//! An agent has sufficient recall when the relevance graph restricted to its
//! own decisions is acyclic: no two of its decisions need each other's
//! policies, so the agent can plan them in sequence as if it remembered its
//! earlier choices.

use tracing::debug;

use super::RelevanceGraph;
use crate::{
    Result,
    error::Error,
    graph::Digraph,
    identifiers::AgentId,
    model::Macid,
};

impl Macid {
    /// Whether `agent` has sufficient recall.
    ///
    /// With `Some(horizon)` only pairs of decisions at most `horizon`
    /// positions apart in topological order are checked; a horizon of zero
    /// checks nothing.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownAgent`] if no node is owned by `agent`
    /// - [`Error::HorizonOutOfRange`] if `horizon` exceeds the number of
    ///   decisions the agent owns
    pub fn sufficient_recall(&self, agent: impl Into<AgentId>, horizon: Option<usize>) -> Result<bool> {
        let agent = agent.into();
        self.require_agent(&agent)?;
        let decisions = self.agent_decisions(&agent);

        if let Some(horizon) = horizon {
            if horizon > decisions.len() {
                return Err(Error::HorizonOutOfRange {
                    agent: agent.to_string(),
                    horizon,
                    available: decisions.len(),
                });
            }
            if horizon == 0 {
                return Ok(true);
            }
        }

        let relevance = RelevanceGraph::restricted(self, &decisions)?;
        let within = |from: &str, to: &str| {
            let position = |node: &str| decisions.iter().position(|d| d == node).unwrap_or(0);
            horizon.is_none_or(|h| position(from).abs_diff(position(to)) <= h)
        };

        let mut window: Digraph = Digraph::new();
        for decision in &decisions {
            window.add_node(decision.clone())?;
        }
        for (from, to) in relevance.edges() {
            if within(from.as_str(), to.as_str()) {
                window.add_edge(from.as_str(), to.as_str())?;
            }
        }

        let recall = window.is_acyclic();
        debug!(%agent, ?horizon, recall, "checked sufficient recall");
        Ok(recall)
    }

    /// Whether every agent has sufficient recall.
    pub fn sufficient_recall_all(&self) -> Result<bool> {
        for agent in self.agents() {
            if !self.sufficient_recall(agent, None)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
