//! Export functionality for analysis results.
//!
//! Currently supports CSV export of decision-rule evaluations.

mod rule_csv;

pub use rule_csv::{RuleCsvExporter, RuleExportRecord, describe_rule};
