//! Builder pattern for [`Macid`] construction
//!
//! Collects nodes, edges and CPD sources, then assembles and validates the
//! model in one go. Nodes are added first, then edges, then CPDs, so a CPD
//! source can refer to parents declared anywhere in the chain.

use std::fmt;

use super::Macid;
use crate::{
    Result,
    cpd::TabularCpd,
    identifiers::{AgentId, NodeId},
    types::{NodeKind, Value},
};

type CpdFunction = Box<dyn Fn(&[Value]) -> Value>;

enum CpdSource {
    Table(TabularCpd),
    Uniform(NodeId),
    Function(NodeId, CpdFunction),
}

impl fmt::Debug for CpdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpdSource::Table(cpd) => f.debug_tuple("Table").field(cpd.variable()).finish(),
            CpdSource::Uniform(node) => f.debug_tuple("Uniform").field(node).finish(),
            CpdSource::Function(node, _) => f.debug_tuple("Function").field(node).finish(),
        }
    }
}

/// Builder for constructing [`Macid`] instances.
///
/// # Examples
///
/// ```
/// use macid::{Macid, Value};
///
/// // D copies S; U rewards matching.
/// let model = Macid::builder()
///     .chance("S", [0, 1])
///     .decision("D", "1", [0, 1])
///     .utility("U", "1", [0, 1])
///     .edges([("S", "D"), ("S", "U"), ("D", "U")])
///     .uniform("S")
///     .function("U", |p| Value::from(p[0] == p[1]))
///     .build()?;
///
/// assert_eq!(model.decisions_without_policy().len(), 1);
/// # Ok::<(), macid::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MacidBuilder {
    nodes: Vec<(NodeId, NodeKind, Option<AgentId>, Vec<Value>)>,
    edges: Vec<(NodeId, NodeId)>,
    cpds: Vec<CpdSource>,
}

impl MacidBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn node<I, V>(
        mut self,
        id: impl Into<NodeId>,
        kind: NodeKind,
        agent: Option<AgentId>,
        domain: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let domain = domain.into_iter().map(Into::into).collect();
        self.nodes.push((id.into(), kind, agent, domain));
        self
    }

    /// Add a chance node.
    pub fn chance<I, V>(self, id: impl Into<NodeId>, domain: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.node(id, NodeKind::Chance, None, domain)
    }

    /// Add a decision node owned by `agent`.
    pub fn decision<I, V>(self, id: impl Into<NodeId>, agent: impl Into<AgentId>, domain: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.node(id, NodeKind::Decision, Some(agent.into()), domain)
    }

    /// Add a utility node owned by `agent`.
    pub fn utility<I, V>(self, id: impl Into<NodeId>, agent: impl Into<AgentId>, domain: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.node(id, NodeKind::Utility, Some(agent.into()), domain)
    }

    pub fn edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    pub fn edges<I, A, B>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<NodeId>,
        B: Into<NodeId>,
    {
        self.edges
            .extend(edges.into_iter().map(|(from, to)| (from.into(), to.into())));
        self
    }

    /// Attach an explicit table.
    pub fn cpd(mut self, cpd: TabularCpd) -> Self {
        self.cpds.push(CpdSource::Table(cpd));
        self
    }

    /// Attach a uniform table over the node's final parents.
    pub fn uniform(mut self, id: impl Into<NodeId>) -> Self {
        self.cpds.push(CpdSource::Uniform(id.into()));
        self
    }

    /// Attach a deterministic table computed from parent values.
    ///
    /// See [`Macid::function_cpd`] for the argument order.
    pub fn function<F>(mut self, id: impl Into<NodeId>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.cpds
            .push(CpdSource::Function(id.into(), Box::new(function)));
        self
    }

    /// Assemble the model.
    ///
    /// # Errors
    ///
    /// Fails with the first structure or validation error hit while adding
    /// nodes, edges or CPDs, exactly as the incremental [`Macid`] API would.
    pub fn build(self) -> Result<Macid> {
        let mut model = Macid::new();
        for (id, kind, agent, domain) in self.nodes {
            model.add_node(id, kind, agent, domain)?;
        }
        for (from, to) in &self.edges {
            model.add_edge(from.as_str(), to.as_str())?;
        }
        for source in self.cpds {
            let cpd = match source {
                CpdSource::Table(cpd) => cpd,
                CpdSource::Uniform(id) => model.uniform_cpd(id.as_str())?,
                CpdSource::Function(id, function) => model.function_cpd(id.as_str(), function)?,
            };
            model.add_cpd(cpd)?;
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    #[test]
    fn builds_nodes_edges_and_cpds() {
        let model = MacidBuilder::new()
            .decision("A", "1", [0, 1])
            .utility("B", "1", [0, 1])
            .edge("A", "B")
            .function("B", |p| p[0].clone())
            .build()
            .unwrap();

        assert_eq!(model.node_count(), 2);
        assert_eq!(model.parents("B"), [NodeId::new("A")]);
        assert!(model.has_cpd("B"));
        assert!(!model.has_cpd("A"));
    }

    #[test]
    fn cycle_in_edges_fails_build() {
        let err = MacidBuilder::new()
            .chance("X", [0, 1])
            .chance("Y", [0, 1])
            .edges([("X", "Y"), ("Y", "X")])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
        assert_eq!(err.kind(), ErrorKind::Structure);
    }

    #[test]
    fn cpd_for_unknown_node_fails() {
        let err = MacidBuilder::new()
            .chance("X", [0, 1])
            .uniform("Y")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownNode { .. }));
    }
}
