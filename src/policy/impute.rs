//! Policy imputation: filling in decisions that have no CPD yet.

use rand::Rng;
use tracing::debug;

use crate::{Result, cpd::TabularCpd, error::Error, model::Macid, types::NodeKind, utils};

impl Macid {
    /// Assign `cpd` as the policy of `decision`.
    ///
    /// # Errors
    ///
    /// [`Error::WrongNodeKind`] unless `decision` is a decision node, plus the
    /// shape checks of [`Macid::add_cpd`].
    pub fn impute_decision(&mut self, decision: &str, cpd: TabularCpd) -> Result<()> {
        self.require_kind(decision, NodeKind::Decision)?;
        if cpd.variable() != decision {
            return Err(Error::CpdShapeMismatch {
                node: decision.to_string(),
                reason: format!("policy is defined for '{}'", cpd.variable()),
            });
        }
        self.add_cpd(cpd)
    }

    /// Give every decision without a policy a uniformly drawn deterministic
    /// rule.
    pub fn impute_random_policy<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        for decision in self.decisions_without_policy() {
            let cardinality = self.cardinality(decision.as_str())?;
            let parents = self.parent_cardinalities(decision.as_str())?;
            let cards: Vec<usize> = parents.iter().map(|(_, card)| *card).collect();
            let rows = utils::assignment_count(&cards).ok_or_else(|| {
                Error::PolicySpaceTooLarge {
                    node: decision.to_string(),
                }
            })?;
            let choices: Vec<usize> = (0..rows)
                .map(|_| rng.random_range(0..cardinality))
                .collect();
            let rule = TabularCpd::deterministic(decision.clone(), cardinality, parents, &choices)?;
            self.add_cpd(rule)?;
        }
        Ok(())
    }

    /// Give every decision without a policy the fully mixed policy.
    pub fn impute_uniform_policy(&mut self) -> Result<()> {
        for decision in self.decisions_without_policy() {
            let policy = self.uniform_cpd(decision.as_str())?;
            self.add_cpd(policy)?;
        }
        Ok(())
    }

    /// Give every decision without a policy an optimal rule.
    ///
    /// Decisions are solved last to first, so later decisions are already
    /// fixed when earlier ones are optimized. Among tied rules the first in
    /// enumeration order is chosen.
    pub fn impute_optimal_policy(&mut self) -> Result<()> {
        for decision in self.decisions_without_policy().into_iter().rev() {
            let rule = self
                .optimal_decision_rules(decision.as_str())?
                .into_iter()
                .next()
                .ok_or_else(|| Error::MissingPolicy {
                    node: decision.to_string(),
                    reason: "no decision rule could be scored".to_string(),
                })?;
            debug!(decision = %decision, "imputed optimal policy");
            self.add_cpd(rule)?;
        }
        Ok(())
    }
}
