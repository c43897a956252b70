//! Decision-rule enumeration and scoring.
//!
//! A decision rule is a deterministic CPD for a decision node: one chosen
//! outcome per joint parent assignment. Rules are enumerated in lexicographic
//! order of their choice vectors (first parent assignment most significant,
//! domain order within a row), so rule `i` is the same on every call.

use tracing::debug;

use crate::{
    Result,
    cpd::TabularCpd,
    error::Error,
    identifiers::{AgentId, NodeId},
    model::Macid,
    types::{Assignment, NodeKind},
    utils::{self, DEFAULT_TIE_TOLERANCE},
};

/// Iterator over every deterministic rule of one decision.
#[derive(Debug, Clone)]
pub struct DecisionRules {
    decision: NodeId,
    cardinality: usize,
    parents: Vec<(NodeId, usize)>,
    choices: Vec<usize>,
    remaining: usize,
}

impl DecisionRules {
    pub fn decision(&self) -> &NodeId {
        &self.decision
    }
}

impl Iterator for DecisionRules {
    type Item = TabularCpd;

    fn next(&mut self) -> Option<TabularCpd> {
        if self.remaining == 0 {
            return None;
        }
        let rule = TabularCpd::from_choices(
            self.decision.clone(),
            self.cardinality,
            &self.parents,
            &self.choices,
        );
        self.remaining -= 1;
        let cards = vec![self.cardinality; self.choices.len()];
        utils::increment_digits(&mut self.choices, &cards);
        Some(rule)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DecisionRules {}

/// Expected utility of one enumerated rule for the decision's owner.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    /// Position of the rule in enumeration order
    pub index: usize,
    pub rule: TabularCpd,
    pub expected_utility: f64,
}

/// Scores rules for one decision against a scratch copy of the model.
///
/// Decisions other than the scored one that have no policy are held at the
/// uniform policy; assigned policies stay as they are.
#[derive(Debug)]
pub struct RuleScorer {
    scratch: Macid,
    decision: NodeId,
    agent: AgentId,
}

impl RuleScorer {
    pub fn decision(&self) -> &NodeId {
        &self.decision
    }

    /// Agent whose utility is maximized.
    pub fn agent(&self) -> &AgentId {
        &self.agent
    }

    /// Expected utility of the owner when the decision follows `rule`.
    pub fn score(&mut self, rule: &TabularCpd) -> Result<f64> {
        if rule.variable() != &self.decision {
            return Err(Error::CpdShapeMismatch {
                node: self.decision.to_string(),
                reason: format!("rule is defined for '{}'", rule.variable()),
            });
        }
        self.scratch.add_cpd(rule.clone())?;
        self.scratch
            .expected_utility(&Assignment::new(), Some(std::slice::from_ref(&self.agent)))
    }
}

impl Macid {
    /// Enumerate all deterministic rules for `decision`.
    ///
    /// There are `|domain| ^ (number of parent assignments)` of them.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownNode`] / [`Error::WrongNodeKind`] unless `decision`
    ///   names a decision node
    /// - [`Error::PolicySpaceTooLarge`] if the count does not fit in `usize`
    pub fn possible_decision_rules(&self, decision: &str) -> Result<DecisionRules> {
        let node = self.require_kind(decision, NodeKind::Decision)?;
        let parents = self.parent_cardinalities(decision)?;
        let too_large = || Error::PolicySpaceTooLarge {
            node: decision.to_string(),
        };

        let cards: Vec<usize> = parents.iter().map(|(_, card)| *card).collect();
        let rows = utils::assignment_count(&cards).ok_or_else(too_large)?;
        let exponent = u32::try_from(rows).map_err(|_| too_large())?;
        let count = node
            .cardinality()
            .checked_pow(exponent)
            .ok_or_else(too_large)?;

        Ok(DecisionRules {
            decision: node.id().clone(),
            cardinality: node.cardinality(),
            parents,
            choices: vec![0; rows],
            remaining: count,
        })
    }

    /// Scratch scorer for the rules of `decision`.
    pub fn rule_scorer(&self, decision: &str) -> Result<RuleScorer> {
        let node = self.require_kind(decision, NodeKind::Decision)?;
        let agent = node
            .agent()
            .cloned()
            .ok_or_else(|| Error::InvalidOwnership {
                node: decision.to_string(),
                kind: NodeKind::Decision.to_string(),
                reason: "must be owned by an agent".to_string(),
            })?;
        let decision = node.id().clone();

        let mut scratch = self.clone();
        for other in self.decisions_without_policy() {
            if other != decision {
                let stand_in = scratch.uniform_cpd(other.as_str())?;
                scratch.set_cpd_unchecked(stand_in);
            }
        }
        Ok(RuleScorer {
            scratch,
            decision,
            agent,
        })
    }

    /// Expected utility of every rule of `decision`, in enumeration order.
    pub fn evaluate_decision_rules(&self, decision: &str) -> Result<Vec<RuleEvaluation>> {
        let rules = self.possible_decision_rules(decision)?;
        let mut scorer = self.rule_scorer(decision)?;
        debug!(decision, rules = rules.len(), agent = %scorer.agent(), "scoring decision rules");

        rules
            .enumerate()
            .map(|(index, rule)| {
                let expected_utility = scorer.score(&rule)?;
                Ok(RuleEvaluation {
                    index,
                    rule,
                    expected_utility,
                })
            })
            .collect()
    }

    /// All rules of `decision` that maximize its owner's expected utility.
    ///
    /// Ties are kept: every rule within [`DEFAULT_TIE_TOLERANCE`] of the best
    /// score is returned, in enumeration order. The result is never empty.
    pub fn optimal_decision_rules(&self, decision: &str) -> Result<Vec<TabularCpd>> {
        self.optimal_decision_rules_with_tolerance(decision, DEFAULT_TIE_TOLERANCE)
    }

    pub fn optimal_decision_rules_with_tolerance(
        &self,
        decision: &str,
        tolerance: f64,
    ) -> Result<Vec<TabularCpd>> {
        let evaluations = self.evaluate_decision_rules(decision)?;
        let optimal: Vec<TabularCpd> = optimal_indices(&evaluations, tolerance)
            .into_iter()
            .map(|index| evaluations[index].rule.clone())
            .collect();
        debug!(
            decision,
            optimal = optimal.len(),
            total = evaluations.len(),
            "found optimal decision rules"
        );
        Ok(optimal)
    }
}

/// Indices of the evaluations within `tolerance` of the best score.
pub fn optimal_indices(evaluations: &[RuleEvaluation], tolerance: f64) -> Vec<usize> {
    let best = evaluations
        .iter()
        .map(|evaluation| evaluation.expected_utility)
        .fold(f64::NEG_INFINITY, f64::max);
    evaluations
        .iter()
        .enumerate()
        .filter(|(_, evaluation)| evaluation.expected_utility >= best - tolerance)
        .map(|(index, _)| index)
        .collect()
}
