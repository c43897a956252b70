//! Ready-made example models.
//!
//! Single-agent CIDs with full CPDs except for the decisions, and small
//! two-agent games used to illustrate reachability, relevance and recall.

use crate::{Result, error::Error, model::Macid, types::Value};

/// Names accepted by [`by_name`].
pub const MODEL_NAMES: &[&str] = &[
    "minimal_cid",
    "three_node_cid",
    "five_node_cid",
    "basic_two_agent_acyclic",
    "basic_two_agent_cyclic",
    "subgame_difference",
    "forgetful_movie_star",
];

/// Look up a catalog model by name.
///
/// # Errors
///
/// [`Error::UnknownCatalogModel`] for names not in [`MODEL_NAMES`].
pub fn by_name(name: &str) -> Result<Macid> {
    match name {
        "minimal_cid" => minimal_cid(),
        "three_node_cid" => three_node_cid(),
        "five_node_cid" => five_node_cid(),
        "basic_two_agent_acyclic" => basic_two_agent_acyclic(),
        "basic_two_agent_cyclic" => basic_two_agent_cyclic(),
        "subgame_difference" => subgame_difference(),
        "forgetful_movie_star" => forgetful_movie_star(),
        _ => Err(Error::UnknownCatalogModel {
            name: name.to_string(),
            expected: MODEL_NAMES.join(", "),
        }),
    }
}

fn equal(parents: &[Value]) -> Value {
    Value::from(parents.windows(2).all(|pair| pair[0] == pair[1]))
}

fn differ(parents: &[Value]) -> Value {
    Value::from(parents.windows(2).any(|pair| pair[0] != pair[1]))
}

/// `A -> B` where the utility `B` equals the decision `A`.
pub fn minimal_cid() -> Result<Macid> {
    Macid::builder()
        .decision("A", 1, [0, 1])
        .utility("B", 1, [0, 1])
        .edge("A", "B")
        .function("B", |p| p[0].clone())
        .build()
}

/// Uniform `S` over {-1, 1} observed by `D`; utility `U = S * D`.
pub fn three_node_cid() -> Result<Macid> {
    Macid::builder()
        .chance("S", [-1, 1])
        .decision("D", 1, [-1, 1])
        .utility("U", 1, [-1, 1])
        .edges([("S", "D"), ("S", "U"), ("D", "U")])
        .uniform("S")
        .function("U", |p| {
            let product = p.iter().filter_map(Value::as_i64).product::<i64>();
            Value::from(product)
        })
        .build()
}

/// Two independent binary signals `S1`, `S2` seen by `D`; `U1` rewards
/// matching `S1`, `U2` rewards matching `S2`.
pub fn five_node_cid() -> Result<Macid> {
    Macid::builder()
        .chance("S1", [0, 1])
        .chance("S2", [0, 1])
        .decision("D", 1, [0, 1])
        .utility("U1", 1, [0, 1])
        .utility("U2", 1, [0, 1])
        .edges([
            ("S1", "D"),
            ("S1", "U1"),
            ("S2", "D"),
            ("S2", "U2"),
            ("D", "U1"),
            ("D", "U2"),
        ])
        .uniform("S1")
        .uniform("S2")
        .function("U1", equal)
        .function("U2", equal)
        .build()
}

fn two_agent_coordination(sequential: bool) -> Result<Macid> {
    let mut builder = Macid::builder()
        .decision("D1", 1, [0, 1])
        .decision("D2", 2, [0, 1])
        .utility("U1", 1, [0, 1, 2])
        .utility("U2", 2, [0, 1])
        .edges([("D1", "U1"), ("D1", "U2"), ("D2", "U2"), ("D2", "U1")]);
    if sequential {
        builder = builder.edge("D1", "D2");
    }
    builder
        .function("U1", |p| match (p[0].as_i64(), p[1].as_i64()) {
            (Some(1), Some(1)) => Value::from(2),
            (Some(0), Some(0)) => Value::from(1),
            _ => Value::from(0),
        })
        .function("U2", equal)
        .build()
}

/// Coordination game where agent 2 observes agent 1's move.
pub fn basic_two_agent_acyclic() -> Result<Macid> {
    two_agent_coordination(true)
}

/// The same game played simultaneously: without `D1 -> D2` each decision is
/// relevant to the other.
pub fn basic_two_agent_cyclic() -> Result<Macid> {
    two_agent_coordination(false)
}

/// Nature moves, agent 1 responds, agent 2 sees only agent 1's move.
///
/// Agent 1 relies on agent 2's policy but not vice versa, and neither
/// decision relies on nature's mechanism.
pub fn subgame_difference() -> Result<Macid> {
    Macid::builder()
        .chance("N", [0, 1])
        .decision("D1", 1, [0, 1])
        .decision("D2", 2, [0, 1])
        .utility("U1_A", 1, [0, 1])
        .utility("U2_A", 2, [0, 1])
        .utility("U1_B", 1, [0, 1])
        .utility("U2_B", 2, [0, 1])
        .edges([
            ("N", "D1"),
            ("N", "U1_A"),
            ("N", "U2_A"),
            ("D1", "U1_A"),
            ("D1", "U2_A"),
            ("D1", "U1_B"),
            ("D1", "U2_B"),
            ("D1", "D2"),
            ("D2", "U1_B"),
            ("D2", "U2_B"),
        ])
        .uniform("N")
        .function("U1_A", equal)
        .function("U2_A", differ)
        .function("U1_B", equal)
        .function("U2_B", differ)
        .build()
}

/// Agent 1 takes two decisions, the second without remembering the first;
/// agent 2 takes one.
pub fn forgetful_movie_star() -> Result<Macid> {
    Macid::builder()
        .chance("S", [0, 1])
        .decision("D11", 1, [0, 1])
        .decision("D12", 1, [0, 1])
        .decision("D2", 2, [0, 1])
        .utility("U11", 1, [0, 1])
        .utility("U12", 1, [0, 1])
        .utility("U2", 2, [0, 1])
        .edges([
            ("S", "D11"),
            ("S", "D2"),
            ("D2", "U2"),
            ("D2", "U11"),
            ("D11", "U2"),
            ("D11", "U11"),
            ("D11", "U12"),
            ("D12", "U12"),
        ])
        .uniform("S")
        .function("U11", differ)
        .function("U12", equal)
        .function("U2", equal)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn every_name_builds() {
        for name in MODEL_NAMES {
            let model = by_name(name).unwrap();
            assert!(!model.decisions().is_empty(), "{name}");
            assert!(model.decisions_without_policy().len() == model.decisions().len());
        }
    }

    #[test]
    fn unknown_name_lists_alternatives() {
        let err = by_name("prisoners_dilemma").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(err.to_string().contains("minimal_cid"));
    }

    #[test]
    fn cyclic_variant_differs_by_one_edge() {
        let acyclic = basic_two_agent_acyclic().unwrap();
        let cyclic = basic_two_agent_cyclic().unwrap();
        assert_eq!(acyclic.node_count(), cyclic.node_count());
        assert_eq!(acyclic.dag().edge_count(), cyclic.dag().edge_count() + 1);
    }
}
