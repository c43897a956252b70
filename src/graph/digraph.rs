use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use petgraph::{
    Direction,
    algo::{has_path_connecting, is_cyclic_directed, tarjan_scc},
    stable_graph::{NodeIndex, StableDiGraph},
    visit::{Bfs, EdgeRef, Reversed, Walker},
};

use super::Adjacency;
use crate::{Result, error::Error, identifiers::NodeId};

/// Directed graph over a petgraph [`StableDiGraph`], keyed by node value.
///
/// Nodes keep their insertion order. Each edge carries the sequence number
/// it was added with, so a node's parents come back in the order their edges
/// were added, which fixes the variable order of CPD tables.
#[derive(Debug, Clone)]
pub struct Digraph<N = NodeId> {
    graph: StableDiGraph<N, u64>,
    index: BTreeMap<N, NodeIndex>,
    order: Vec<N>,
    next_edge: u64,
}

impl<N> Default for Digraph<N> {
    fn default() -> Self {
        Self {
            graph: StableDiGraph::default(),
            index: BTreeMap::new(),
            order: Vec::new(),
            next_edge: 0,
        }
    }
}

impl<N> Digraph<N>
where
    N: Ord + Clone + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an isolated node.
    pub fn add_node(&mut self, node: impl Into<N>) -> Result<()> {
        let node = node.into();
        if self.index.contains_key(&node) {
            return Err(Error::DuplicateNode {
                node: node.to_string(),
            });
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node.clone(), idx);
        self.order.push(node);
        Ok(())
    }

    /// Remove a node together with all incident edges.
    pub fn remove_node<Q>(&mut self, node: &Q) -> Result<()>
    where
        N: Borrow<Q>,
        Q: Ord + fmt::Display + ?Sized,
    {
        let idx = self.require(node)?;
        self.graph.remove_node(idx);
        self.index.remove(node);
        self.order.retain(|n| <N as Borrow<Q>>::borrow(n) != node);
        Ok(())
    }

    /// Add the edge `from -> to`. Adding an existing edge is a no-op.
    pub fn add_edge<Q>(&mut self, from: &Q, to: &Q) -> Result<()>
    where
        N: Borrow<Q>,
        Q: Ord + fmt::Display + ?Sized,
    {
        let a = self.require(from)?;
        let b = self.require(to)?;
        if a == b {
            return Err(Error::SelfLoop {
                node: from.to_string(),
            });
        }
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, self.next_edge);
            self.next_edge += 1;
        }
        Ok(())
    }

    /// Remove the edge `from -> to`, returning whether it existed.
    pub fn remove_edge<Q>(&mut self, from: &Q, to: &Q) -> Result<bool>
    where
        N: Borrow<Q>,
        Q: Ord + fmt::Display + ?Sized,
    {
        let a = self.require(from)?;
        let b = self.require(to)?;
        Ok(match self.graph.find_edge(a, b) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        })
    }

    pub fn contains<Q>(&self, node: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.index.contains_key(node)
    }

    pub fn has_edge<Q>(&self, from: &Q, to: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[N] {
        &self.order
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as `(from, to)` pairs, grouped by child in node order.
    pub fn edges(&self) -> Vec<(N, N)> {
        self.order
            .iter()
            .flat_map(|child| {
                self.parents(child)
                    .into_iter()
                    .map(move |parent| (parent, child.clone()))
            })
            .collect()
    }

    /// Parents in the order their edges were added; empty for unknown nodes.
    pub fn parents<Q>(&self, node: &Q) -> Vec<N>
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.neighbors(node, Direction::Incoming)
    }

    /// Children in the order their edges were added; empty for unknown nodes.
    pub fn children<Q>(&self, node: &Q) -> Vec<N>
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.neighbors(node, Direction::Outgoing)
    }

    fn neighbors<Q>(&self, node: &Q, direction: Direction) -> Vec<N>
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(&idx) = self.index.get(node) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|edge| *edge.weight());
        edges
            .into_iter()
            .map(|edge| match direction {
                Direction::Incoming => self.graph[edge.source()].clone(),
                Direction::Outgoing => self.graph[edge.target()].clone(),
            })
            .collect()
    }

    /// Whether a directed path of length >= 0 leads from `from` to `to`.
    pub fn has_path<Q>(&self, from: &Q, to: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// Strict descendants of `node`.
    pub fn descendants<Q>(&self, node: &Q) -> BTreeSet<N>
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(&start) = self.index.get(node) else {
            return BTreeSet::new();
        };
        Bfs::new(&self.graph, start)
            .iter(&self.graph)
            .filter(|&idx| idx != start)
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Strict ancestors of `node`.
    pub fn ancestors<Q>(&self, node: &Q) -> BTreeSet<N>
    where
        N: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(&start) = self.index.get(node) else {
            return BTreeSet::new();
        };
        let reversed = Reversed(&self.graph);
        Bfs::new(reversed, start)
            .iter(reversed)
            .filter(|&idx| idx != start)
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Strongly connected components.
    ///
    /// Components come out in reverse topological order of the condensation:
    /// a component is emitted only after every component it points to.
    /// Members of a component are listed in insertion order.
    pub fn strongly_connected_components(&self) -> Vec<Vec<N>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .map(|component| {
                let members: BTreeSet<&N> =
                    component.iter().map(|&idx| &self.graph[idx]).collect();
                self.order
                    .iter()
                    .filter(|node| members.contains(node))
                    .cloned()
                    .collect()
            })
            .collect()
    }

    /// Whether the graph has no directed cycle.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    pub(crate) fn require<Q>(&self, node: &Q) -> Result<NodeIndex>
    where
        N: Borrow<Q>,
        Q: Ord + fmt::Display + ?Sized,
    {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| Error::UnknownNode {
                node: node.to_string(),
            })
    }

    pub(crate) fn petgraph(&self) -> &StableDiGraph<N, u64> {
        &self.graph
    }
}

impl<N> Adjacency for Digraph<N>
where
    N: Ord + Clone + fmt::Display,
{
    type Node = N;

    fn parents_of(&self, node: &N) -> Vec<N> {
        self.parents(node)
    }

    fn children_of(&self, node: &N) -> Vec<N> {
        self.children(node)
    }

    fn contains_node(&self, node: &N) -> bool {
        self.contains(node)
    }
}
