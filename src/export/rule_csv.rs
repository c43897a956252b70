//! CSV export of decision-rule evaluations.

use std::path::Path;

use serde::Serialize;

use crate::{
    Result,
    cpd::TabularCpd,
    error::Error,
    model::Macid,
    policy::{RuleEvaluation, optimal_indices},
    utils,
};

/// A single row in the rule CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleExportRecord {
    pub decision: String,
    pub rule_index: usize,
    /// Rule written as `parent=value,... -> choice` rows joined by `; `
    pub rule: String,
    pub expected_utility: f64,
    pub optimal: bool,
}

/// Human-readable form of a deterministic rule.
///
/// Each row maps one parent assignment to the chosen outcome, e.g.
/// `S=0 -> 1; S=1 -> 0`. Rows of a stochastic CPD are shown as their
/// probability vectors instead.
pub fn describe_rule(model: &Macid, rule: &TabularCpd) -> Result<String> {
    let domain = model.domain(rule.variable().as_str())?;
    let parent_domains = rule
        .parents()
        .iter()
        .map(|parent| model.domain(parent.as_str()))
        .collect::<Result<Vec<_>>>()?;
    let choices = rule.deterministic_choices();

    let mut rows = Vec::with_capacity(rule.row_count());
    for row in 0..rule.row_count() {
        let states = utils::decode_index(row, rule.parent_cardinalities());
        let condition = rule
            .parents()
            .iter()
            .zip(&states)
            .zip(&parent_domains)
            .map(|((parent, &state), values)| format!("{parent}={}", values[state]))
            .collect::<Vec<_>>()
            .join(",");
        let outcome = match &choices {
            Some(choices) => domain[choices[row]].to_string(),
            None => format!("{:?}", rule.row(row)),
        };
        if condition.is_empty() {
            rows.push(format!("-> {outcome}"));
        } else {
            rows.push(format!("{condition} -> {outcome}"));
        }
    }
    Ok(rows.join("; "))
}

/// Exporter for rule evaluation CSV files.
pub struct RuleCsvExporter;

impl RuleCsvExporter {
    /// Build export records, marking rules within `tolerance` of the best.
    pub fn records(
        model: &Macid,
        evaluations: &[RuleEvaluation],
        tolerance: f64,
    ) -> Result<Vec<RuleExportRecord>> {
        let optimal = optimal_indices(evaluations, tolerance);
        evaluations
            .iter()
            .enumerate()
            .map(|(position, evaluation)| {
                Ok(RuleExportRecord {
                    decision: evaluation.rule.variable().to_string(),
                    rule_index: evaluation.index,
                    rule: describe_rule(model, &evaluation.rule)?,
                    expected_utility: evaluation.expected_utility,
                    optimal: optimal.contains(&position),
                })
            })
            .collect()
    }

    /// Write every evaluation as one CSV row.
    ///
    /// # Returns
    /// Number of rows written
    pub fn export(
        model: &Macid,
        evaluations: &[RuleEvaluation],
        tolerance: f64,
        path: &Path,
    ) -> Result<usize> {
        let records = Self::records(model, evaluations, tolerance)?;
        let mut writer = csv::Writer::from_path(path)?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flushing {}", path.display()),
            source,
        })?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog, utils::DEFAULT_TIE_TOLERANCE};

    #[test]
    fn describes_rules_with_domain_values() {
        let model = catalog::three_node_cid().unwrap();
        let rule = model.possible_decision_rules("D").unwrap().nth(1).unwrap();
        assert_eq!(describe_rule(&model, &rule).unwrap(), "S=-1 -> -1; S=1 -> 1");
    }

    #[test]
    fn exports_one_row_per_rule() {
        let model = catalog::five_node_cid().unwrap();
        let evaluations = model.evaluate_decision_rules("D").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.csv");

        let written =
            RuleCsvExporter::export(&model, &evaluations, DEFAULT_TIE_TOLERANCE, &path).unwrap();
        assert_eq!(written, 16);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["decision", "rule_index", "rule", "expected_utility", "optimal"]
        );
        let optimal = reader
            .records()
            .filter(|record| &record.as_ref().unwrap()[4] == "true")
            .count();
        assert_eq!(optimal, 4);
    }
}
