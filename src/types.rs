//! Core value types shared across the model, inference and analysis layers.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::identifiers::NodeId;

/// One outcome in a node's discrete domain.
///
/// Utility nodes need numeric outcomes; chance and decision nodes may also
/// use labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Real(f64),
    Label(String),
}

impl Value {
    /// Numeric view of the outcome, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Real(x) => Some(*x),
            Value::Label(_) => None,
        }
    }

    /// Integer view of the outcome, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Label(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Real(x) => write!(f, "{x}"),
            Value::Label(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Int(i64::from(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Label(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Label(s)
    }
}

/// The role a node plays in an influence diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Chance,
    Decision,
    Utility,
}

impl NodeKind {
    /// Whether nodes of this kind must be owned by an agent.
    pub fn requires_owner(self) -> bool {
        !matches!(self, NodeKind::Chance)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Chance => "chance",
            NodeKind::Decision => "decision",
            NodeKind::Utility => "utility",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial assignment of outcomes to nodes, used for evidence and interventions.
pub type Assignment = BTreeMap<NodeId, Value>;

/// Build an [`Assignment`] from `(node, value)` pairs.
///
/// # Examples
///
/// ```
/// use macid::types::{Value, assignment};
///
/// let evidence = assignment([("D", -1), ("S", -1)]);
/// assert_eq!(evidence["D"], Value::Int(-1));
/// ```
pub fn assignment<I, K, V>(pairs: I) -> Assignment
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<NodeId>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(node, value)| (node.into(), value.into()))
        .collect()
}

/// Render an assignment as `{A=0, B=1}` for error messages and logs.
pub fn format_assignment(assignment: &Assignment) -> String {
    let parts: Vec<String> = assignment
        .iter()
        .map(|(node, value)| format!("{node}={value}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_views() {
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::from("high").as_f64(), None);
        assert!(!Value::from("high").is_numeric());
    }

    #[test]
    fn untagged_serde_keeps_variants() {
        let values: Vec<Value> = serde_json::from_str(r#"[1, 0.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Real(0.5), Value::Label("x".into())]
        );
    }

    #[test]
    fn assignment_formats_sorted() {
        let evidence = assignment([("S", 1), ("D", 0)]);
        assert_eq!(format_assignment(&evidence), "{D=0, S=1}");
    }
}
