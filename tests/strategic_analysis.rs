//! Reachability, relevance graphs, mechanism graphs and sufficient recall.

mod common;

use std::collections::BTreeSet;

use common::model;
use macid::{
    Assignment, Error, ErrorKind, Macid, MechanismGraph, NodeId, RelevanceGraph, Value, catalog,
    types::assignment,
};

fn ids(names: &[&str]) -> BTreeSet<NodeId> {
    names.iter().map(|name| NodeId::new(*name)).collect()
}

#[test]
fn test_s_reachability_is_not_symmetric() {
    let acyclic = model("basic_two_agent_acyclic");
    assert!(acyclic.is_s_reachable("D1", "D2").unwrap());
    assert!(!acyclic.is_s_reachable("D2", "D1").unwrap());

    let subgame = model("subgame_difference");
    assert!(subgame.is_s_reachable("D1", "D2").unwrap());
    assert!(!subgame.is_s_reachable("D2", "D1").unwrap());
}

#[test]
fn test_r_reachability_in_subgame_example() {
    let subgame = model("subgame_difference");
    assert!(!subgame.is_r_reachable("D2", "D1").unwrap());
    assert!(!subgame.is_r_reachable("D2", "N").unwrap());
    assert!(!subgame.is_r_reachable("D1", "N").unwrap());
    assert!(subgame.is_r_reachable("D1", "D2").unwrap());
}

#[test]
fn test_reachability_argument_errors() {
    let subgame = model("subgame_difference");
    let err = subgame.is_r_reachable("N", "D1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    let err = subgame.is_r_reachable("D1", "Missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    // s-reachability is only defined between decisions
    assert!(subgame.is_s_reachable("D1", "N").is_err());
}

#[test]
fn test_relevance_graph_acyclicity() {
    let acyclic = RelevanceGraph::new(&model("basic_two_agent_acyclic")).unwrap();
    assert!(acyclic.is_acyclic());
    assert!(acyclic.has_edge("D2", "D1"));
    assert!(!acyclic.has_edge("D1", "D2"));
    assert_eq!(
        acyclic.topological_order(),
        Some(vec![NodeId::new("D2"), NodeId::new("D1")])
    );

    let cyclic = RelevanceGraph::new(&model("basic_two_agent_cyclic")).unwrap();
    assert!(!cyclic.is_acyclic());
    assert_eq!(cyclic.topological_order(), None);
    assert_eq!(cyclic.strongly_connected_components().len(), 1);
}

#[test]
fn test_relevance_components_follow_solving_order() {
    let movie_star = RelevanceGraph::new(&model("forgetful_movie_star")).unwrap();
    let components = movie_star.strongly_connected_components();
    let total: usize = components.iter().map(Vec::len).sum();
    assert_eq!(total, 3);
    // Every edge points from an earlier component to a later one or stays inside
    let position = |node: &NodeId| components.iter().position(|c| c.contains(node)).unwrap();
    for (from, to) in movie_star.edges() {
        assert!(position(&from) <= position(&to), "{from} -> {to}");
    }
}

#[test]
fn test_mechanism_graph_shape() {
    let game = model("basic_two_agent_acyclic");
    let mechanisms = MechanismGraph::new(&game).unwrap();
    assert_eq!(mechanisms.all_decision_nodes(), &ids(&["D1", "D2"]));
    assert_eq!(mechanisms.all_utility_nodes(), &ids(&["U1", "U2"]));
    assert_eq!(mechanisms.node_count(), 2 * game.node_count());

    for name in catalog::MODEL_NAMES {
        let example = model(name);
        let graph = MechanismGraph::new(&example).unwrap();
        assert_eq!(graph.node_count(), 2 * example.node_count(), "{name}");
    }
}

fn relay(extra: Option<&str>) -> Macid {
    // D -> M -> T and D -> U, with no policy at D
    let mut builder = Macid::builder()
        .decision("D", 1, [0, 1])
        .chance("M", [0, 1])
        .chance("T", [0, 1])
        .utility("U", 1, [0, 1])
        .edges([("D", "M"), ("M", "T"), ("D", "U")])
        .function("M", |p| p[0].clone())
        .function("T", |p| p[0].clone())
        .function("U", |p| p[0].clone());
    if let Some(name) = extra {
        builder = builder.chance(name, [0, 1]).uniform(name);
    }
    builder.build().unwrap()
}

#[test]
fn test_mechanism_graph_accepts_any_node_name() {
    let evidence = assignment([("M", 1)]);
    for extra in [None, Some("Z_mec"), Some("D_mec")] {
        let model = relay(extra);
        let mechanisms = MechanismGraph::new(&model).unwrap();
        assert_eq!(mechanisms.node_count(), 2 * model.node_count(), "{extra:?}");

        // M blocks D's mechanism from T, so D's missing policy does not matter
        let posterior = model.query(&["T"], &evidence).unwrap();
        let marginal = posterior.marginal("T").unwrap();
        assert_eq!(marginal, vec![(Value::from(0), 0.0), (Value::from(1), 1.0)], "{extra:?}");
    }
    assert!(matches!(
        relay(Some("Z_mec")).query(&["U"], &Assignment::new()),
        Err(Error::MissingPolicy { .. })
    ));
}

#[test]
fn test_sufficient_recall_regressions() {
    let movie_star = model("forgetful_movie_star");
    assert!(!movie_star.sufficient_recall(1, None).unwrap());
    assert!(movie_star.sufficient_recall(2, None).unwrap());
    assert!(!movie_star.sufficient_recall_all().unwrap());

    let acyclic = model("basic_two_agent_acyclic");
    assert!(acyclic.sufficient_recall(1, None).unwrap());
    assert!(acyclic.sufficient_recall(2, None).unwrap());
    let err = acyclic.sufficient_recall(3, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(acyclic.sufficient_recall_all().unwrap());
}

#[test]
fn test_sufficient_recall_horizons() {
    let movie_star = model("forgetful_movie_star");
    // Agent 1 owns two decisions
    assert!(movie_star.sufficient_recall(1, Some(0)).unwrap());
    assert!(!movie_star.sufficient_recall(1, Some(1)).unwrap());
    assert!(!movie_star.sufficient_recall(1, Some(2)).unwrap());
    assert!(matches!(
        movie_star.sufficient_recall(1, Some(3)),
        Err(Error::HorizonOutOfRange { .. })
    ));
}

#[test]
fn test_agent_without_decisions_has_recall() {
    // Agent 2 only receives a payoff
    let model = Macid::builder()
        .decision("D", 1, [0, 1])
        .utility("U1", 1, [0, 1])
        .utility("U2", 2, [0, 1])
        .edges([("D", "U1"), ("D", "U2")])
        .build()
        .unwrap();
    assert!(model.sufficient_recall(2, None).unwrap());
    assert!(model.sufficient_recall(2, Some(0)).unwrap());
    assert!(matches!(
        model.sufficient_recall(2, Some(1)),
        Err(Error::HorizonOutOfRange { available: 0, .. })
    ));
    assert!(model.sufficient_recall_all().unwrap());
}
