//! Error types for the MACID crate

use thiserror::Error;

/// Broad category of an [`Error`].
///
/// Every error raised by the engine belongs to exactly one category, so
/// callers can react to "the graph would become cyclic" or "the evidence is
/// impossible" without matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Graph mutation would violate acyclicity or node-type constraints.
    Structure,
    /// CPD shape mismatch, or a missing/unnormalized CPD found by `check_model`.
    Validation,
    /// Query against impossible evidence, or an unknown/unready variable.
    Inference,
    /// Invalid node/agent reference or out-of-range argument.
    Value,
    /// Persistence and export failures.
    Io,
}

/// Main error type for the MACID crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("node '{node}' already exists")]
    DuplicateNode { node: String },

    #[error("adding edge {from} -> {to} would create a cycle")]
    CycleDetected { from: String, to: String },

    #[error("self-loop on node '{node}' is not allowed")]
    SelfLoop { node: String },

    #[error("{kind} node '{node}' {reason}")]
    InvalidOwnership {
        node: String,
        kind: String,
        reason: String,
    },

    #[error("invalid domain for node '{node}': {reason}")]
    InvalidDomain { node: String, reason: String },

    #[error("CPD for '{node}' does not match the model: {reason}")]
    CpdShapeMismatch { node: String, reason: String },

    #[error("node '{node}' has no CPD")]
    MissingCpd { node: String },

    #[error("CPD for '{node}' is not normalized: row {row} sums to {sum}")]
    UnnormalizedCpd { node: String, row: usize, sum: f64 },

    #[error("CPD for '{node}' contains invalid probability {value} at row {row}")]
    InvalidProbability { node: String, row: usize, value: f64 },

    #[error("value '{value}' is not in the domain of '{node}'")]
    OutcomeNotInDomain { node: String, value: String },

    #[error("unknown variable '{node}' in query")]
    UnknownVariable { node: String },

    #[error("query outcome '{value}' is not in the domain of '{node}'")]
    InvalidOutcome { node: String, value: String },

    #[error("query must name at least one target variable")]
    EmptyQuery,

    #[error("variable '{node}' is both a query target and evidence")]
    TargetInEvidence { node: String },

    #[error("variable '{node}' has no CPD and is needed by the query")]
    UnreadyVariable { node: String },

    #[error("decision '{node}' has no policy: {reason}")]
    MissingPolicy { node: String, reason: String },

    #[error("evidence {evidence} has zero probability")]
    ZeroProbabilityEvidence { evidence: String },

    #[error("variable '{node}' has a non-numeric domain")]
    NonNumericDomain { node: String },

    #[error("unknown node '{node}'")]
    UnknownNode { node: String },

    #[error("unknown agent '{agent}'")]
    UnknownAgent { agent: String },

    #[error("'{node}' is a {actual} node, expected a {expected} node")]
    WrongNodeKind {
        node: String,
        expected: String,
        actual: String,
    },

    #[error(
        "recall horizon {horizon} exceeds the {available} decision(s) owned by agent '{agent}'"
    )]
    HorizonOutOfRange {
        agent: String,
        horizon: usize,
        available: usize,
    },

    #[error("cannot intervene on '{node}' with '{value}': not in its domain")]
    InvalidIntervention { node: String, value: String },

    #[error("decision '{node}' has too many possible decision rules to enumerate")]
    PolicySpaceTooLarge { node: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unknown catalog model '{name}'. Expected one of: {expected}")]
    UnknownCatalogModel { name: String, expected: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateNode { .. }
            | Error::CycleDetected { .. }
            | Error::SelfLoop { .. }
            | Error::InvalidOwnership { .. } => ErrorKind::Structure,

            Error::InvalidDomain { .. }
            | Error::CpdShapeMismatch { .. }
            | Error::MissingCpd { .. }
            | Error::UnnormalizedCpd { .. }
            | Error::InvalidProbability { .. }
            | Error::OutcomeNotInDomain { .. } => ErrorKind::Validation,

            Error::UnknownVariable { .. }
            | Error::InvalidOutcome { .. }
            | Error::EmptyQuery
            | Error::TargetInEvidence { .. }
            | Error::UnreadyVariable { .. }
            | Error::MissingPolicy { .. }
            | Error::ZeroProbabilityEvidence { .. }
            | Error::NonNumericDomain { .. } => ErrorKind::Inference,

            Error::UnknownNode { .. }
            | Error::UnknownAgent { .. }
            | Error::WrongNodeKind { .. }
            | Error::HorizonOutOfRange { .. }
            | Error::InvalidIntervention { .. }
            | Error::PolicySpaceTooLarge { .. }
            | Error::InvalidConfiguration { .. }
            | Error::UnknownCatalogModel { .. } => ErrorKind::Value,

            Error::Io { .. }
            | Error::Serialization(_)
            | Error::SerializationContext { .. }
            | Error::Csv(_) => ErrorKind::Io,
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        let cycle = Error::CycleDetected {
            from: "A".into(),
            to: "B".into(),
        };
        assert_eq!(cycle.kind(), ErrorKind::Structure);

        let zero = Error::ZeroProbabilityEvidence {
            evidence: "{S=0}".into(),
        };
        assert_eq!(zero.kind(), ErrorKind::Inference);

        let horizon = Error::HorizonOutOfRange {
            agent: "1".into(),
            horizon: 3,
            available: 2,
        };
        assert_eq!(horizon.kind(), ErrorKind::Value);
        assert!(horizon.to_string().contains("agent '1'"));
    }
}
