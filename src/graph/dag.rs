use std::ops::Deref;

use petgraph::algo::toposort;

use super::{Adjacency, Digraph};
use crate::{Result, error::Error, identifiers::NodeId};

/// Directed acyclic graph.
///
/// Every mutation preserves acyclicity: an edge that would close a cycle is
/// rejected with [`Error::CycleDetected`] and the graph is left untouched.
/// Read access goes through [`Deref`] to the underlying [`Digraph`].
#[derive(Debug, Clone, Default)]
pub struct Dag {
    graph: Digraph,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a DAG from nodes and edges, failing on the first invalid edge.
    pub fn from_edges<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<NodeId>,
        E: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut dag = Self::new();
        for node in nodes {
            dag.add_node(node)?;
        }
        for (from, to) in edges {
            dag.add_edge(from.as_str(), to.as_str())?;
        }
        Ok(dag)
    }

    pub fn add_node(&mut self, node: impl Into<NodeId>) -> Result<()> {
        self.graph.add_node(node)
    }

    pub fn remove_node(&mut self, node: &str) -> Result<()> {
        self.graph.remove_node(node)
    }

    /// Add `from -> to` unless it would create a cycle.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        self.graph.require(from)?;
        self.graph.require(to)?;
        if from != to && self.graph.has_path(to, from) {
            return Err(Error::CycleDetected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.graph.add_edge(from, to)
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        self.graph.remove_edge(from, to)
    }

    /// Drop every incoming edge of `node`.
    pub fn detach_parents(&mut self, node: &str) -> Result<()> {
        for parent in self.graph.parents(node) {
            self.graph.remove_edge(parent.as_str(), node)?;
        }
        Ok(())
    }

    /// Nodes ordered so that every parent precedes its children.
    ///
    /// The order comes from a depth-first sort over the nodes in insertion
    /// order, so it is deterministic for a given construction sequence.
    pub fn topological_order(&self) -> Vec<NodeId> {
        let graph = self.graph.petgraph();
        match toposort(graph, None) {
            Ok(order) => order.into_iter().map(|idx| graph[idx].clone()).collect(),
            // every mutation keeps the graph acyclic
            Err(_) => Vec::new(),
        }
    }

    pub fn as_digraph(&self) -> &Digraph {
        &self.graph
    }
}

impl Deref for Dag {
    type Target = Digraph;

    fn deref(&self) -> &Digraph {
        &self.graph
    }
}

impl Adjacency for Dag {
    type Node = NodeId;

    fn parents_of(&self, node: &NodeId) -> Vec<NodeId> {
        self.graph.parents(node)
    }

    fn children_of(&self, node: &NodeId) -> Vec<NodeId> {
        self.graph.children(node)
    }

    fn contains_node(&self, node: &NodeId) -> bool {
        self.graph.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn diamond() -> Dag {
        let edges = [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]
            .map(|(a, b)| (NodeId::new(a), NodeId::new(b)));
        Dag::from_edges(["A", "B", "C", "D"], edges).unwrap()
    }

    #[test]
    fn cycle_creating_edge_is_rejected() {
        let mut dag = diamond();
        let err = dag.add_edge("D", "A").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(!dag.has_edge("D", "A"));
        assert_eq!(dag.edge_count(), 4);
    }

    #[test]
    fn topological_order_respects_edges() {
        let dag = diamond();
        let order = dag.topological_order();
        let position = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert_eq!(order.len(), 4);
        assert!(position("A") < position("B"));
        assert!(position("B") < position("D"));
        assert!(position("C") < position("D"));
    }

    #[test]
    fn topological_order_survives_node_removal() {
        let mut dag = diamond();
        dag.remove_node("B").unwrap();
        dag.add_node("E").unwrap();
        dag.add_edge("D", "E").unwrap();
        assert_eq!(
            dag.topological_order(),
            ["A", "C", "D", "E"].map(NodeId::new).to_vec()
        );
    }

    #[test]
    fn detach_parents_clears_incoming_edges() {
        let mut dag = diamond();
        dag.detach_parents("D").unwrap();
        assert!(dag.parents("D").is_empty());
        assert_eq!(dag.children("B").len(), 0);
    }
}
