use std::{collections::BTreeSet, fmt};

use crate::{
    Result,
    graph::{Digraph, is_d_connected},
    identifiers::NodeId,
    model::Macid,
};

/// Node of a [`MechanismGraph`].
///
/// Tagging keeps the two copies of a variable apart whatever the model's
/// node names are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MechNode {
    /// The variable itself
    Object(NodeId),
    /// The process generating the variable's CPD
    Mechanism(NodeId),
}

impl MechNode {
    pub fn object(node: impl Into<NodeId>) -> Self {
        Self::Object(node.into())
    }

    pub fn mechanism(node: impl Into<NodeId>) -> Self {
        Self::Mechanism(node.into())
    }

    /// Model node this graph node stands for.
    pub fn node(&self) -> &NodeId {
        match self {
            Self::Object(node) | Self::Mechanism(node) => node,
        }
    }

    pub fn is_mechanism(&self) -> bool {
        matches!(self, Self::Mechanism(_))
    }
}

impl fmt::Display for MechNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(node) => write!(f, "{node}"),
            Self::Mechanism(node) => write!(f, "mechanism({node})"),
        }
    }
}

/// Model graph extended with one mechanism node per variable.
///
/// For every node `V` there is an object-level node and a mechanism node
/// with `Mechanism(V) -> Object(V)`. Model edges are copied between
/// object-level nodes, and `Mechanism(V) -> Mechanism(D)` whenever `V` is
/// r-reachable from decision `D`. Those strategic edges can form cycles, so
/// the result is a plain [`Digraph`].
#[derive(Debug, Clone)]
pub struct MechanismGraph {
    graph: Digraph<MechNode>,
    decisions: BTreeSet<NodeId>,
    utilities: BTreeSet<NodeId>,
}

impl MechanismGraph {
    pub fn new(model: &Macid) -> Result<Self> {
        let mut graph: Digraph<MechNode> = Digraph::new();
        for node in model.nodes() {
            graph.add_node(MechNode::object(node))?;
        }
        for node in model.nodes() {
            let mechanism = MechNode::mechanism(node);
            graph.add_node(mechanism.clone())?;
            graph.add_edge(&mechanism, &MechNode::object(node))?;
        }
        for (from, to) in model.dag().edges() {
            graph.add_edge(&MechNode::Object(from), &MechNode::Object(to))?;
        }

        let decisions = model.decisions();
        for decision in &decisions {
            let target = MechNode::mechanism(decision);
            for node in model.nodes() {
                if node != decision && model.is_r_reachable(decision.as_str(), node.as_str())? {
                    graph.add_edge(&MechNode::mechanism(node), &target)?;
                }
            }
        }

        Ok(Self {
            graph,
            decisions: decisions.into_iter().collect(),
            utilities: model.utilities().into_iter().collect(),
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Object-level decision nodes.
    pub fn all_decision_nodes(&self) -> &BTreeSet<NodeId> {
        &self.decisions
    }

    /// Object-level utility nodes.
    pub fn all_utility_nodes(&self) -> &BTreeSet<NodeId> {
        &self.utilities
    }

    pub fn has_edge(&self, from: &MechNode, to: &MechNode) -> bool {
        self.graph.has_edge(from, to)
    }

    /// Whether an active trail connects `a` and `b` given the observed
    /// object-level nodes.
    pub fn is_d_connected(&self, a: &MechNode, b: &MechNode, observed: &BTreeSet<NodeId>) -> bool {
        let observed: BTreeSet<MechNode> = observed.iter().map(MechNode::object).collect();
        is_d_connected(&self.graph, a, b, &observed)
    }

    pub fn as_digraph(&self) -> &Digraph<MechNode> {
        &self.graph
    }
}
