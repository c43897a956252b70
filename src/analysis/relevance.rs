use tracing::debug;

use crate::{
    Result, graph::Digraph, identifiers::NodeId, model::Macid, types::NodeKind,
};

/// Directed graph over decisions encoding strategic relevance.
///
/// There is an edge `D -> D'` when `D` is r-reachable from `D'`, meaning the
/// owner of `D'` needs to know the policy at `D` to choose optimally. An
/// acyclic relevance graph yields an order in which decisions can be solved
/// one at a time; a cycle is a property of the game, not an error.
#[derive(Debug, Clone)]
pub struct RelevanceGraph {
    graph: Digraph,
}

impl RelevanceGraph {
    /// Relevance graph over every decision of the model.
    pub fn new(model: &Macid) -> Result<Self> {
        Self::restricted(model, &model.decisions())
    }

    /// Relevance graph over a subset of decisions.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`](crate::Error::UnknownNode) /
    /// [`Error::WrongNodeKind`](crate::Error::WrongNodeKind) unless every
    /// listed node is a decision.
    pub fn restricted(model: &Macid, decisions: &[NodeId]) -> Result<Self> {
        let mut graph: Digraph = Digraph::new();
        for decision in decisions {
            model.require_kind(decision.as_str(), NodeKind::Decision)?;
            if !graph.contains(decision.as_str()) {
                graph.add_node(decision.clone())?;
            }
        }

        for relied_on in decisions {
            for relying in decisions {
                if relied_on != relying
                    && model.is_r_reachable(relying.as_str(), relied_on.as_str())?
                {
                    graph.add_edge(relied_on.as_str(), relying.as_str())?;
                }
            }
        }

        debug!(
            decisions = graph.node_count(),
            edges = graph.edge_count(),
            "built relevance graph"
        );
        Ok(Self { graph })
    }

    pub fn nodes(&self) -> &[NodeId] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.graph.edges()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.graph.has_edge(from, to)
    }

    pub fn is_acyclic(&self) -> bool {
        self.graph.is_acyclic()
    }

    /// Groups of mutually relevant decisions, in a compatible solving order.
    pub fn strongly_connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut components = self.graph.strongly_connected_components();
        components.reverse();
        components
    }

    /// Decisions ordered so that every decision comes after the ones it
    /// relies on, or `None` if the graph is cyclic.
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        if !self.is_acyclic() {
            return None;
        }
        Some(
            self.strongly_connected_components()
                .into_iter()
                .flatten()
                .collect(),
        )
    }

    pub fn as_digraph(&self) -> &Digraph {
        &self.graph
    }
}
