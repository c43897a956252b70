use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    cpd::TabularCpd,
    error::Error,
    graph::Dag,
    identifiers::{AgentId, NodeId},
    types::{NodeKind, Value},
    utils::{self, PROBABILITY_TOLERANCE},
};

/// Metadata of one node: its role, owner and discrete domain.
///
/// Kind and owner are fixed at creation; parents live in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    agent: Option<AgentId>,
    domain: Vec<Value>,
}

impl Node {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn agent(&self) -> Option<&AgentId> {
        self.agent.as_ref()
    }

    pub fn domain(&self) -> &[Value] {
        &self.domain
    }

    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// Index of `value` in the domain.
    pub fn state_index(&self, value: &Value) -> Option<usize> {
        self.domain.iter().position(|v| v == value)
    }
}

/// Multi-agent causal influence diagram.
///
/// Owns the typed DAG and the CPDs assigned so far. A model may be partially
/// specified (typically decisions without policies); [`Macid::check_model`]
/// tells whether it is ready for evaluation.
///
/// # Examples
///
/// ```
/// use macid::{Macid, NodeKind};
///
/// let mut model = Macid::new();
/// model.add_node("S", NodeKind::Chance, None, vec![0.into(), 1.into()])?;
/// model.add_node("D", NodeKind::Decision, Some("1".into()), vec![0.into(), 1.into()])?;
/// model.add_edge("S", "D")?;
/// assert!(model.add_edge("D", "S").is_err());
/// # Ok::<(), macid::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Macid {
    dag: Dag,
    nodes: BTreeMap<NodeId, Node>,
    cpds: BTreeMap<NodeId, TabularCpd>,
}

impl Macid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fluent builder.
    pub fn builder() -> super::MacidBuilder {
        super::MacidBuilder::new()
    }

    /// Add a typed node.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateNode`] if the id is taken
    /// - [`Error::InvalidOwnership`] if a decision/utility node has no owner or
    ///   a chance node has one
    /// - [`Error::InvalidDomain`] for empty domains, duplicate outcomes, or
    ///   non-numeric utility outcomes
    pub fn add_node(
        &mut self,
        id: impl Into<NodeId>,
        kind: NodeKind,
        agent: Option<AgentId>,
        domain: Vec<Value>,
    ) -> Result<()> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode {
                node: id.into_inner(),
            });
        }
        match (kind.requires_owner(), &agent) {
            (true, None) => {
                return Err(Error::InvalidOwnership {
                    node: id.into_inner(),
                    kind: kind.to_string(),
                    reason: "must be owned by an agent".to_string(),
                });
            }
            (false, Some(owner)) => {
                return Err(Error::InvalidOwnership {
                    node: id.into_inner(),
                    kind: kind.to_string(),
                    reason: format!("cannot be owned (got agent '{owner}')"),
                });
            }
            _ => {}
        }
        validate_domain(&id, kind, &domain)?;

        self.dag.add_node(id.clone())?;
        self.nodes.insert(
            id.clone(),
            Node {
                id,
                kind,
                agent,
                domain,
            },
        );
        Ok(())
    }

    pub fn add_chance(&mut self, id: impl Into<NodeId>, domain: Vec<Value>) -> Result<()> {
        self.add_node(id, NodeKind::Chance, None, domain)
    }

    pub fn add_decision(
        &mut self,
        id: impl Into<NodeId>,
        agent: impl Into<AgentId>,
        domain: Vec<Value>,
    ) -> Result<()> {
        self.add_node(id, NodeKind::Decision, Some(agent.into()), domain)
    }

    pub fn add_utility(
        &mut self,
        id: impl Into<NodeId>,
        agent: impl Into<AgentId>,
        domain: Vec<Value>,
    ) -> Result<()> {
        self.add_node(id, NodeKind::Utility, Some(agent.into()), domain)
    }

    /// Remove a node, its incident edges and its CPD.
    ///
    /// CPDs of former children keep their old shape and will fail
    /// [`Macid::check_model`] until replaced.
    pub fn remove_node(&mut self, id: &str) -> Result<()> {
        self.dag.remove_node(id)?;
        self.nodes.remove(id);
        self.cpds.remove(id);
        Ok(())
    }

    /// Add the edge `from -> to`, rejecting cycles with a structure error.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        self.dag.add_edge(from, to)
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        self.dag.remove_edge(from, to)
    }

    /// Attach a CPD to its node, replacing any previous one.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownNode`] if the CPD's variable is not in the model
    /// - [`Error::CpdShapeMismatch`] if the declared parents or cardinalities
    ///   differ from the node's current parents and domains
    pub fn add_cpd(&mut self, cpd: TabularCpd) -> Result<()> {
        self.validate_cpd(&cpd)?;
        self.cpds.insert(cpd.variable().clone(), cpd);
        Ok(())
    }

    pub fn add_cpds<I>(&mut self, cpds: I) -> Result<()>
    where
        I: IntoIterator<Item = TabularCpd>,
    {
        for cpd in cpds {
            self.add_cpd(cpd)?;
        }
        Ok(())
    }

    pub fn remove_cpd(&mut self, id: &str) -> Option<TabularCpd> {
        self.cpds.remove(id)
    }

    pub fn cpd(&self, id: &str) -> Option<&TabularCpd> {
        self.cpds.get(id)
    }

    pub fn has_cpd(&self, id: &str) -> bool {
        self.cpds.contains_key(id)
    }

    /// CPDs in node-id order.
    pub fn cpds(&self) -> impl Iterator<Item = &TabularCpd> {
        self.cpds.values()
    }

    pub fn cpd_count(&self) -> usize {
        self.cpds.len()
    }

    /// Check that `cpd` fits the node's current parents and domains.
    pub fn validate_cpd(&self, cpd: &TabularCpd) -> Result<()> {
        let node = self.require_node(cpd.variable().as_str())?;
        let mismatch = |reason: String| Error::CpdShapeMismatch {
            node: node.id.to_string(),
            reason,
        };

        if cpd.cardinality() != node.cardinality() {
            return Err(mismatch(format!(
                "cardinality {} differs from domain size {}",
                cpd.cardinality(),
                node.cardinality()
            )));
        }

        let current = self.dag.parents(node.id.as_str());
        let declared: BTreeSet<&NodeId> = cpd.parents().iter().collect();
        if declared.len() != cpd.parents().len() {
            return Err(mismatch("parents listed more than once".to_string()));
        }
        let actual: BTreeSet<&NodeId> = current.iter().collect();
        if declared != actual {
            let names = |set: &BTreeSet<&NodeId>| {
                set.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ")
            };
            return Err(mismatch(format!(
                "declared parents [{}] but graph parents are [{}]",
                names(&declared),
                names(&actual)
            )));
        }

        for (parent, &card) in cpd.parents().iter().zip(cpd.parent_cardinalities()) {
            let expected = self.cardinality(parent.as_str())?;
            if card != expected {
                return Err(mismatch(format!(
                    "parent '{parent}' declared with cardinality {card}, domain has {expected}"
                )));
            }
        }

        let rows = utils::assignment_count(cpd.parent_cardinalities())
            .ok_or_else(|| mismatch("parent assignment count overflows".to_string()))?;
        if cpd.values().len() != rows * cpd.cardinality() {
            return Err(mismatch(format!(
                "table has {} entries, expected {}",
                cpd.values().len(),
                rows * cpd.cardinality()
            )));
        }
        Ok(())
    }

    /// Validate the full model.
    ///
    /// Every node needs a CPD matching its current parents, and every CPD row
    /// must be a probability distribution (within [`PROBABILITY_TOLERANCE`]).
    pub fn check_model(&self) -> Result<()> {
        for id in self.dag.nodes() {
            let cpd = self.cpds.get(id).ok_or_else(|| Error::MissingCpd {
                node: id.to_string(),
            })?;
            self.validate_cpd(cpd)?;
            cpd.validate_rows(PROBABILITY_TOLERANCE)?;
        }
        Ok(())
    }

    /// Structurally identical model with every CPD cleared.
    pub fn copy_without_cpds(&self) -> Self {
        Self {
            dag: self.dag.clone(),
            nodes: self.nodes.clone(),
            cpds: BTreeMap::new(),
        }
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub(crate) fn dag_mut(&mut self) -> &mut Dag {
        &mut self.dag
    }

    /// Store a CPD without shape validation; callers guarantee the shape.
    pub(crate) fn set_cpd_unchecked(&mut self, cpd: TabularCpd) {
        self.cpds.insert(cpd.variable().clone(), cpd);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn require_node(&self, id: &str) -> Result<&Node> {
        self.nodes.get(id).ok_or_else(|| Error::UnknownNode {
            node: id.to_string(),
        })
    }

    /// Look up a node and check that it has the expected kind.
    pub(crate) fn require_kind(&self, id: &str, expected: NodeKind) -> Result<&Node> {
        let node = self.require_node(id)?;
        if node.kind != expected {
            return Err(Error::WrongNodeKind {
                node: id.to_string(),
                expected: expected.to_string(),
                actual: node.kind.to_string(),
            });
        }
        Ok(node)
    }

    pub fn kind(&self, id: &str) -> Option<NodeKind> {
        self.nodes.get(id).map(Node::kind)
    }

    pub fn owner(&self, id: &str) -> Option<&AgentId> {
        self.nodes.get(id).and_then(Node::agent)
    }

    pub fn domain(&self, id: &str) -> Result<&[Value]> {
        Ok(self.require_node(id)?.domain())
    }

    pub fn cardinality(&self, id: &str) -> Result<usize> {
        Ok(self.require_node(id)?.cardinality())
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> &[NodeId] {
        self.dag.nodes()
    }

    pub fn node_count(&self) -> usize {
        self.dag.node_count()
    }

    /// Parents in the order their edges were added.
    pub fn parents(&self, id: &str) -> Vec<NodeId> {
        self.dag.parents(id)
    }

    pub fn children(&self, id: &str) -> Vec<NodeId> {
        self.dag.children(id)
    }

    /// Current parents paired with their cardinalities, in graph order.
    pub fn parent_cardinalities(&self, id: &str) -> Result<Vec<(NodeId, usize)>> {
        self.require_node(id)?;
        self.dag
            .parents(id)
            .into_iter()
            .map(|parent| {
                let card = self.cardinality(parent.as_str())?;
                Ok((parent, card))
            })
            .collect()
    }

    /// Agents owning at least one node.
    pub fn agents(&self) -> BTreeSet<AgentId> {
        self.nodes
            .values()
            .filter_map(|node| node.agent.clone())
            .collect()
    }

    fn nodes_where<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.dag
            .topological_order()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(&predicate))
            .collect()
    }

    /// Decision nodes in topological order.
    pub fn decisions(&self) -> Vec<NodeId> {
        self.nodes_where(|node| node.kind == NodeKind::Decision)
    }

    /// Utility nodes in topological order.
    pub fn utilities(&self) -> Vec<NodeId> {
        self.nodes_where(|node| node.kind == NodeKind::Utility)
    }

    pub fn chance_nodes(&self) -> Vec<NodeId> {
        self.nodes_where(|node| node.kind == NodeKind::Chance)
    }

    /// Decisions owned by `agent`, in topological order.
    pub fn agent_decisions(&self, agent: &AgentId) -> Vec<NodeId> {
        self.nodes_where(|node| {
            node.kind == NodeKind::Decision && node.agent.as_ref() == Some(agent)
        })
    }

    /// Utility nodes owned by `agent`, in topological order.
    pub fn agent_utilities(&self, agent: &AgentId) -> Vec<NodeId> {
        self.nodes_where(|node| {
            node.kind == NodeKind::Utility && node.agent.as_ref() == Some(agent)
        })
    }

    pub(crate) fn require_agent(&self, agent: &AgentId) -> Result<()> {
        if self.nodes.values().any(|node| node.agent.as_ref() == Some(agent)) {
            Ok(())
        } else {
            Err(Error::UnknownAgent {
                agent: agent.to_string(),
            })
        }
    }

    /// Decisions that currently have no policy assigned.
    pub fn decisions_without_policy(&self) -> Vec<NodeId> {
        self.decisions()
            .into_iter()
            .filter(|d| !self.cpds.contains_key(d))
            .collect()
    }

    /// Uniform CPD for `id` over its current parents.
    pub fn uniform_cpd(&self, id: &str) -> Result<TabularCpd> {
        let card = self.cardinality(id)?;
        TabularCpd::uniform(id, card, self.parent_cardinalities(id)?)
    }

    /// Tabulate a deterministic CPD from a function of the parents' values.
    ///
    /// The function receives parent outcomes in the node's current parent
    /// order and must return an outcome from the node's domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutcomeNotInDomain`] if the function produces a value
    /// outside the domain.
    pub fn function_cpd<F>(&self, id: &str, function: F) -> Result<TabularCpd>
    where
        F: Fn(&[Value]) -> Value,
    {
        let node = self.require_node(id)?;
        let parents = self.parent_cardinalities(id)?;
        let domains: Vec<&[Value]> = parents
            .iter()
            .map(|(parent, _)| self.domain(parent.as_str()))
            .collect::<Result<_>>()?;
        let cards: Vec<usize> = parents.iter().map(|(_, card)| *card).collect();

        let mut choices = Vec::new();
        let mut digits = vec![0; cards.len()];
        loop {
            let inputs: Vec<Value> = digits
                .iter()
                .zip(&domains)
                .map(|(&digit, domain)| domain[digit].clone())
                .collect();
            let output = function(&inputs);
            let state = node
                .state_index(&output)
                .ok_or_else(|| Error::OutcomeNotInDomain {
                    node: id.to_string(),
                    value: output.to_string(),
                })?;
            choices.push(state);
            if !utils::increment_digits(&mut digits, &cards) {
                break;
            }
        }

        TabularCpd::deterministic(id, node.cardinality(), parents, &choices)
    }
}

fn validate_domain(id: &NodeId, kind: NodeKind, domain: &[Value]) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidDomain {
        node: id.to_string(),
        reason: reason.to_string(),
    };
    if domain.is_empty() {
        return Err(invalid("domain must not be empty"));
    }
    for (idx, value) in domain.iter().enumerate() {
        if domain[..idx].contains(value) {
            return Err(invalid(&format!("outcome '{value}' appears more than once")));
        }
    }
    if kind == NodeKind::Utility && !domain.iter().all(Value::is_numeric) {
        return Err(invalid("utility outcomes must be numeric"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn values(xs: &[i64]) -> Vec<Value> {
        xs.iter().map(|&x| Value::Int(x)).collect()
    }

    fn three_node() -> Macid {
        let mut model = Macid::new();
        model.add_chance("S", values(&[-1, 1])).unwrap();
        model.add_decision("D", "1", values(&[-1, 1])).unwrap();
        model.add_utility("U", "1", values(&[-1, 1])).unwrap();
        model.add_edge("S", "D").unwrap();
        model.add_edge("S", "U").unwrap();
        model.add_edge("D", "U").unwrap();
        model
    }

    #[test]
    fn ownership_rules_are_enforced() {
        let mut model = Macid::new();
        let err = model
            .add_node("D", NodeKind::Decision, None, values(&[0, 1]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);

        let err = model
            .add_node("S", NodeKind::Chance, Some("1".into()), values(&[0, 1]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
    }

    #[test]
    fn utility_domain_must_be_numeric() {
        let mut model = Macid::new();
        let err = model
            .add_utility("U", "1", vec![Value::from("low"), Value::from("high")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn add_cpd_rejects_parent_mismatch() {
        let mut model = three_node();
        let stale = TabularCpd::uniform("D", 2, Vec::new()).unwrap();
        let err = model.add_cpd(stale).unwrap_err();
        assert!(matches!(err, Error::CpdShapeMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn cpd_parent_order_may_differ_from_graph_order() {
        let mut model = three_node();
        let cpd = TabularCpd::uniform(
            "U",
            2,
            vec![(NodeId::new("D"), 2), (NodeId::new("S"), 2)],
        )
        .unwrap();
        assert!(model.add_cpd(cpd).is_ok());
    }

    #[test]
    fn function_cpd_follows_parent_order() {
        let model = three_node();
        let cpd = model
            .function_cpd("U", |p| {
                Value::Int(p[0].as_i64().unwrap_or(0) * p[1].as_i64().unwrap_or(0))
            })
            .unwrap();
        // parents are [S, D]; S=-1, D=-1 gives 1, which is state index 1
        assert_eq!(cpd.probability(&[0, 0], 1), 1.0);
        assert_eq!(cpd.probability(&[0, 1], 0), 1.0);
    }

    #[test]
    fn function_cpd_rejects_outcome_outside_domain() {
        let model = three_node();
        let err = model.function_cpd("U", |_| Value::Int(7)).unwrap_err();
        assert!(matches!(err, Error::OutcomeNotInDomain { .. }));
    }

    #[test]
    fn check_model_reports_missing_cpd() {
        let model = three_node();
        assert!(matches!(
            model.check_model(),
            Err(Error::MissingCpd { .. })
        ));
    }

    #[test]
    fn agent_views_are_topological() {
        let model = three_node();
        let agent = AgentId::from("1");
        assert_eq!(model.agent_decisions(&agent), vec![NodeId::new("D")]);
        assert_eq!(model.agent_utilities(&agent), vec![NodeId::new("U")]);
        assert_eq!(model.agents().len(), 1);
        assert!(model.require_agent(&AgentId::from("2")).is_err());
    }
}
