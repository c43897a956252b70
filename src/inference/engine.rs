//! Exact inference by variable elimination.
//!
//! Queries only touch the ancestral closure of the query and evidence
//! variables; everything outside it sums to one and cannot change the answer.
//! Decisions without a policy inside that closure are acceptable as long as
//! their policy cannot influence the targets, which is decided on the
//! mechanism graph. Such decisions get a uniform stand-in policy.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use super::Factor;
use crate::{
    Result,
    analysis::{MechNode, MechanismGraph},
    cpd::TabularCpd,
    error::Error,
    identifiers::{AgentId, NodeId},
    model::Macid,
    types::{Assignment, NodeKind, Value, format_assignment},
    utils,
};

/// Normalized joint distribution over query targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    domains: Vec<Vec<Value>>,
    factor: Factor,
}

impl Distribution {
    /// Variables in the order they were requested.
    pub fn variables(&self) -> &[NodeId] {
        self.factor.variables()
    }

    pub fn factor(&self) -> &Factor {
        &self.factor
    }

    /// Probability of a complete outcome of the target variables.
    ///
    /// Returns `None` if the outcome misses a variable or uses a value outside
    /// its domain.
    pub fn probability(&self, outcome: &Assignment) -> Option<f64> {
        let states: Vec<usize> = self
            .variables()
            .iter()
            .zip(&self.domains)
            .map(|(var, domain)| {
                let value = outcome.get(var)?;
                domain.iter().position(|v| v == value)
            })
            .collect::<Option<_>>()?;
        Some(self.factor.value(&states))
    }

    /// Marginal distribution of one target, paired with its domain values.
    pub fn marginal(&self, variable: &str) -> Option<Vec<(Value, f64)>> {
        let pos = self.variables().iter().position(|v| v == variable)?;
        let mut factor = self.factor.clone();
        for other in self.variables() {
            if other != variable {
                factor = factor.marginalize(other.as_str());
            }
        }
        Some(
            self.domains[pos]
                .iter()
                .cloned()
                .zip(factor.values().iter().copied())
                .collect(),
        )
    }

    /// Expected value of a numeric target.
    pub fn expectation(&self, variable: &str) -> Option<f64> {
        self.marginal(variable)?
            .iter()
            .map(|(value, p)| value.as_f64().map(|x| x * p))
            .sum()
    }

    /// Every joint outcome with its probability, last variable fastest.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<&Value>, f64)> + '_ {
        self.factor
            .values()
            .iter()
            .enumerate()
            .map(move |(index, &p)| {
                let digits = utils::decode_index(index, self.factor.cardinalities());
                let outcome = digits
                    .iter()
                    .zip(&self.domains)
                    .map(|(&digit, domain)| &domain[digit])
                    .collect();
                (outcome, p)
            })
    }
}

/// Where a missing policy would matter: the probe variables, seen through
/// the given observations.
struct Probe<'a> {
    targets: &'a BTreeSet<NodeId>,
    observed: &'a BTreeSet<NodeId>,
}

impl Macid {
    /// Posterior joint distribution of `targets` given `evidence`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`], [`Error::UnknownVariable`],
    ///   [`Error::TargetInEvidence`] or [`Error::InvalidOutcome`] for malformed
    ///   queries
    /// - [`Error::UnreadyVariable`] if a chance or utility node the query
    ///   depends on has no CPD
    /// - [`Error::MissingPolicy`] if a decision without a policy is observed or
    ///   can influence the targets
    /// - [`Error::ZeroProbabilityEvidence`] if the evidence is impossible
    ///
    /// # Examples
    ///
    /// ```
    /// use macid::{Macid, Value, types::assignment};
    ///
    /// let mut model = Macid::builder()
    ///     .decision("A", "1", [0, 1])
    ///     .utility("B", "1", [0, 1])
    ///     .edge("A", "B")
    ///     .function("B", |p| p[0].clone())
    ///     .build()?;
    /// model.impute_uniform_policy()?;
    ///
    /// let posterior = model.query(&["B"], &assignment([("A", 1)]))?;
    /// assert_eq!(posterior.probability(&assignment([("B", 1)])), Some(1.0));
    /// # Ok::<(), macid::Error>(())
    /// ```
    pub fn query<S: AsRef<str>>(&self, targets: &[S], evidence: &Assignment) -> Result<Distribution> {
        if targets.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let mut order: Vec<NodeId> = Vec::with_capacity(targets.len());
        for target in targets {
            let target = target.as_ref();
            if !self.contains(target) {
                return Err(Error::UnknownVariable {
                    node: target.to_string(),
                });
            }
            if evidence.contains_key(target) {
                return Err(Error::TargetInEvidence {
                    node: target.to_string(),
                });
            }
            if !order.iter().any(|t| t == target) {
                order.push(NodeId::new(target));
            }
        }
        let states = self.evidence_states(evidence)?;

        let target_set: BTreeSet<NodeId> = order.iter().cloned().collect();
        let observed: BTreeSet<NodeId> = states.keys().cloned().collect();
        let probe = Probe {
            targets: &target_set,
            observed: &observed,
        };
        let joint = self.eliminate(&order, &states, &probe)?;

        let factor = joint.normalize().ok_or_else(|| Error::ZeroProbabilityEvidence {
            evidence: format_assignment(evidence),
        })?;
        let domains = order
            .iter()
            .map(|target| self.domain(target.as_str()).map(<[Value]>::to_vec))
            .collect::<Result<_>>()?;
        Ok(Distribution { domains, factor })
    }

    /// Probability of the evidence under the current CPDs.
    pub fn evidence_probability(&self, evidence: &Assignment) -> Result<f64> {
        let states = self.evidence_states(evidence)?;
        let targets: BTreeSet<NodeId> = states.keys().cloned().collect();
        let probe = Probe {
            targets: &targets,
            observed: &BTreeSet::new(),
        };
        Ok(self.eliminate(&[], &states, &probe)?.total())
    }

    /// Apply `do(assignment)` in place.
    ///
    /// Each intervened node loses its incoming edges and gets a point-mass
    /// CPD on the assigned value. All nodes and values are validated before
    /// anything is changed.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownNode`] for nodes not in the model
    /// - [`Error::InvalidIntervention`] for values outside the node's domain
    pub fn intervene(&mut self, intervention: &Assignment) -> Result<()> {
        let mut surgery = Vec::with_capacity(intervention.len());
        for (node, value) in intervention {
            let info = self.require_node(node.as_str())?;
            let state = info
                .state_index(value)
                .ok_or_else(|| Error::InvalidIntervention {
                    node: node.to_string(),
                    value: value.to_string(),
                })?;
            surgery.push((node.clone(), info.cardinality(), state));
        }

        for (node, cardinality, state) in surgery {
            self.dag_mut().detach_parents(node.as_str())?;
            let cpd = TabularCpd::point_mass(node.clone(), cardinality, state)?;
            self.set_cpd_unchecked(cpd);
        }
        debug!(intervention = %format_assignment(intervention), "applied intervention");
        Ok(())
    }

    /// Expected value of each target given evidence, optionally under an
    /// intervention applied to a scratch copy of the model.
    ///
    /// # Errors
    ///
    /// [`Error::NonNumericDomain`] for targets with label outcomes, plus every
    /// error of [`Macid::query`] and [`Macid::intervene`].
    pub fn expected_value<S: AsRef<str>>(
        &self,
        targets: &[S],
        evidence: &Assignment,
        intervention: Option<&Assignment>,
    ) -> Result<Vec<f64>> {
        for target in targets {
            let target = target.as_ref();
            let domain = self.domain(target).map_err(|_| Error::UnknownVariable {
                node: target.to_string(),
            })?;
            if !domain.iter().all(Value::is_numeric) {
                return Err(Error::NonNumericDomain {
                    node: target.to_string(),
                });
            }
        }

        let scratch;
        let model = match intervention {
            Some(intervention) => {
                let mut copy = self.clone();
                copy.intervene(intervention)?;
                scratch = copy;
                &scratch
            }
            None => self,
        };

        let distribution = model.query(targets, evidence)?;
        targets
            .iter()
            .map(|target| {
                let target = target.as_ref();
                distribution
                    .expectation(target)
                    .ok_or_else(|| Error::NonNumericDomain {
                        node: target.to_string(),
                    })
            })
            .collect()
    }

    /// Total expected utility given `context`, summed over the utility nodes
    /// of `agents` (all agents when `None`).
    ///
    /// Utility nodes fixed by the context contribute their observed value.
    /// Decisions fixed by the context need no policy: conditioning on the
    /// chosen value makes the rule irrelevant, so a uniform stand-in is used.
    pub fn expected_utility(&self, context: &Assignment, agents: Option<&[AgentId]>) -> Result<f64> {
        self.evidence_states(context)?;
        let unassigned: Vec<&NodeId> = context
            .keys()
            .filter(|node| {
                self.kind(node.as_str()) == Some(NodeKind::Decision) && !self.has_cpd(node.as_str())
            })
            .collect();
        if !unassigned.is_empty() {
            let mut scratch = self.clone();
            for node in unassigned {
                let stand_in = scratch.uniform_cpd(node.as_str())?;
                scratch.set_cpd_unchecked(stand_in);
            }
            return scratch.expected_utility(context, agents);
        }
        let utilities = match agents {
            None => self.utilities(),
            Some(agents) => {
                let mut nodes = Vec::new();
                for agent in agents {
                    self.require_agent(agent)?;
                    nodes.extend(self.agent_utilities(agent));
                }
                nodes
            }
        };

        let mut total = 0.0;
        for utility in &utilities {
            total += match context.get(utility) {
                Some(value) => value.as_f64().ok_or_else(|| Error::NonNumericDomain {
                    node: utility.to_string(),
                })?,
                None => self.expected_value(&[utility], context, None)?[0],
            };
        }
        Ok(total)
    }

    fn evidence_states(&self, evidence: &Assignment) -> Result<BTreeMap<NodeId, usize>> {
        evidence
            .iter()
            .map(|(node, value)| {
                let info = self.node(node.as_str()).ok_or_else(|| Error::UnknownVariable {
                    node: node.to_string(),
                })?;
                let state = info
                    .state_index(value)
                    .ok_or_else(|| Error::InvalidOutcome {
                        node: node.to_string(),
                        value: value.to_string(),
                    })?;
                Ok((node.clone(), state))
            })
            .collect()
    }

    /// Targets and evidence together with all their ancestors.
    fn ancestral_closure<'a, I>(&self, seeds: I) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let mut closure = BTreeSet::new();
        for seed in seeds {
            closure.extend(self.dag().ancestors(seed.as_str()));
            closure.insert(seed.clone());
        }
        closure
    }

    /// CPD to use for `node` in a query, or why there is none.
    fn query_cpd(
        &self,
        node: &NodeId,
        evidence: &BTreeMap<NodeId, usize>,
        probe: &Probe<'_>,
        mechanisms: Option<&MechanismGraph>,
    ) -> Result<TabularCpd> {
        if let Some(cpd) = self.cpd(node.as_str()) {
            return Ok(cpd.clone());
        }
        if self.kind(node.as_str()) != Some(NodeKind::Decision) {
            return Err(Error::UnreadyVariable {
                node: node.to_string(),
            });
        }
        if evidence.contains_key(node) {
            return Err(Error::MissingPolicy {
                node: node.to_string(),
                reason: "it is observed as evidence".to_string(),
            });
        }

        let influential = mechanisms.is_some_and(|graph| {
            let mechanism = MechNode::mechanism(node);
            probe.targets.iter().any(|target| {
                graph.is_d_connected(&mechanism, &MechNode::object(target), probe.observed)
            })
        });
        if influential {
            return Err(Error::MissingPolicy {
                node: node.to_string(),
                reason: "its policy can influence the queried variables".to_string(),
            });
        }
        self.uniform_cpd(node.as_str())
    }

    /// Unnormalized factor over `targets` with the evidence summed in.
    fn eliminate(
        &self,
        targets: &[NodeId],
        evidence: &BTreeMap<NodeId, usize>,
        probe: &Probe<'_>,
    ) -> Result<Factor> {
        let closure = self.ancestral_closure(targets.iter().chain(evidence.keys()));
        let order: Vec<NodeId> = self
            .dag()
            .topological_order()
            .into_iter()
            .filter(|node| closure.contains(node))
            .collect();

        let needs_mechanisms = order.iter().any(|node| {
            !self.has_cpd(node.as_str())
                && self.kind(node.as_str()) == Some(NodeKind::Decision)
                && !evidence.contains_key(node)
        });
        let mechanisms = if needs_mechanisms {
            Some(MechanismGraph::new(self)?)
        } else {
            None
        };

        let mut factors = Vec::with_capacity(order.len());
        for node in &order {
            let cpd = self.query_cpd(node, evidence, probe, mechanisms.as_ref())?;
            let mut factor = Factor::from_cpd(&cpd);
            for (var, &state) in evidence {
                if factor.contains(var.as_str()) {
                    factor = factor.reduce(var.as_str(), state);
                }
            }
            factors.push(factor);
        }

        for node in order.iter().rev() {
            if targets.contains(node) || evidence.contains_key(node) {
                continue;
            }
            let (touching, rest): (Vec<Factor>, Vec<Factor>) = factors
                .into_iter()
                .partition(|factor| factor.contains(node.as_str()));
            let product = touching
                .iter()
                .fold(Factor::unit(), |acc, factor| acc.product(factor));
            trace!(
                variable = %node,
                factors = touching.len(),
                scope = product.variables().len(),
                "eliminating variable"
            );
            factors = rest;
            factors.push(product.marginalize(node.as_str()));
        }

        let joint = factors
            .iter()
            .fold(Factor::unit(), |acc, factor| acc.product(factor));
        joint.permute(targets).ok_or_else(|| Error::UnknownVariable {
            node: targets
                .iter()
                .map(NodeId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, types::assignment};

    fn noisy_sensor() -> Macid {
        // Rain -> Wet, P(Rain) = 0.3, P(Wet | Rain) = 0.9, P(Wet | dry) = 0.2
        Macid::builder()
            .chance("Rain", [0, 1])
            .chance("Wet", [0, 1])
            .edge("Rain", "Wet")
            .cpd(TabularCpd::root("Rain", vec![0.7, 0.3]).unwrap())
            .cpd(
                TabularCpd::new(
                    "Wet",
                    2,
                    vec![(NodeId::new("Rain"), 2)],
                    vec![vec![0.8, 0.2], vec![0.1, 0.9]],
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn posterior_follows_bayes_rule() {
        let model = noisy_sensor();
        let posterior = model.query(&["Rain"], &assignment([("Wet", 1)])).unwrap();
        let p_wet = 0.7 * 0.2 + 0.3 * 0.9;
        let expected = 0.3 * 0.9 / p_wet;
        let got = posterior.probability(&assignment([("Rain", 1)])).unwrap();
        assert!((got - expected).abs() < 1e-12);

        let evidence = model
            .evidence_probability(&assignment([("Wet", 1)]))
            .unwrap();
        assert!((evidence - p_wet).abs() < 1e-12);
    }

    #[test]
    fn malformed_queries_are_inference_errors() {
        let model = noisy_sensor();
        let none = Assignment::new();
        let empty: [&str; 0] = [];
        for err in [
            model.query(&empty, &none).unwrap_err(),
            model.query(&["Snow"], &none).unwrap_err(),
            model
                .query(&["Rain"], &assignment([("Rain", 1)]))
                .unwrap_err(),
            model.query(&["Rain"], &assignment([("Wet", 5)])).unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Inference);
        }
    }

    #[test]
    fn impossible_evidence_is_rejected() {
        let mut model = noisy_sensor();
        model
            .add_cpd(TabularCpd::root("Rain", vec![1.0, 0.0]).unwrap())
            .unwrap();
        model
            .add_cpd(
                TabularCpd::deterministic("Wet", 2, vec![(NodeId::new("Rain"), 2)], &[0, 1])
                    .unwrap(),
            )
            .unwrap();
        let err = model
            .query(&["Rain"], &assignment([("Wet", 1)]))
            .unwrap_err();
        assert!(matches!(err, Error::ZeroProbabilityEvidence { .. }));
    }

    #[test]
    fn intervention_cuts_incoming_edges() {
        let model = noisy_sensor();
        let mut surgery = model.clone();
        surgery.intervene(&assignment([("Wet", 1)])).unwrap();
        assert!(surgery.parents("Wet").is_empty());

        // Observing Wet=1 shifts belief in Rain; setting it does not.
        let posterior = surgery.query(&["Rain"], &assignment([("Wet", 1)])).unwrap();
        let p = posterior.probability(&assignment([("Rain", 1)])).unwrap();
        assert!((p - 0.3).abs() < 1e-12);

        let err = surgery
            .intervene(&assignment([("Rain", 3)]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn expected_value_uses_scratch_copy_for_intervention() {
        let model = noisy_sensor();
        let ev = model
            .expected_value(&["Wet"], &Assignment::new(), Some(&assignment([("Rain", 1)])))
            .unwrap();
        assert!((ev[0] - 0.9).abs() < 1e-12);
        assert_eq!(model.parents("Wet").len(), 1);
    }

    #[test]
    fn label_domains_have_no_expectation() {
        let model = Macid::builder()
            .chance("Weather", ["sun", "rain"])
            .uniform("Weather")
            .build()
            .unwrap();
        let err = model
            .expected_value(&["Weather"], &Assignment::new(), None)
            .unwrap_err();
        assert!(matches!(err, Error::NonNumericDomain { .. }));
    }

    #[test]
    fn irrelevant_missing_policy_gets_uniform_stand_in() {
        // D has no policy but only influences U, not S.
        let model = Macid::builder()
            .chance("S", [0, 1])
            .decision("D", "1", [0, 1])
            .utility("U", "1", [0, 1])
            .edges([("S", "D"), ("D", "U")])
            .uniform("S")
            .function("U", |p| p[0].clone())
            .build()
            .unwrap();

        assert!(model.query(&["S"], &Assignment::new()).is_ok());
        let err = model.query(&["U"], &Assignment::new()).unwrap_err();
        assert!(matches!(err, Error::MissingPolicy { .. }));
        let err = model
            .query(&["S"], &assignment([("D", 0)]))
            .unwrap_err();
        assert!(matches!(err, Error::MissingPolicy { .. }));
    }
}
