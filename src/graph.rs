//! Directed graph structure underlying influence diagrams.
//!
//! - **digraph**: insertion-ordered directed graph backed by `petgraph`
//! - **dag**: acyclic wrapper that rejects cycle-creating edges
//! - **separation**: d-separation queries (Bayes-ball reachability)
//!
//! The separation routines only need parent/child lookups, so they are written
//! against the [`Adjacency`] trait and run on both the acyclic model graph and
//! the (possibly cyclic) mechanism graph, whose nodes are not plain ids.

pub mod dag;
pub mod digraph;
pub mod separation;

pub use dag::Dag;
pub use digraph::Digraph;
pub use separation::{
    active_trail_nodes, is_d_connected, is_d_connected_via_new_parent, observed_ancestors,
};

/// Read-only parent/child access to a directed graph.
pub trait Adjacency {
    type Node: Ord + Clone;

    /// Parents of `node`; empty for unknown nodes.
    fn parents_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Children of `node`; empty for unknown nodes.
    fn children_of(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn contains_node(&self, node: &Self::Node) -> bool;
}
