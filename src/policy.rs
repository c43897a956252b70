//! Decision rules and policies.
//!
//! - **rules**: enumeration of deterministic decision rules, scoring against
//!   the owner's expected utility, and tie-preserving optimization
//! - **impute**: filling in missing policies (random, uniform or optimal)

pub mod impute;
pub mod rules;

pub use rules::{DecisionRules, RuleEvaluation, RuleScorer, optimal_indices};
