//! Exact inference, interventions and expected utility on the example CIDs.

mod common;

use common::{assert_close, model};
use macid::{AgentId, Assignment, Error, ErrorKind, TabularCpd, types::assignment};

#[test]
fn test_three_node_expected_utility_regressions() {
    let three_node = model("three_node_cid");
    let eu = three_node
        .expected_utility(&assignment([("D", -1), ("S", -1)]), None)
        .unwrap();
    assert_close(eu, 1.0);
    let eu = three_node
        .expected_utility(&assignment([("D", 1), ("S", -1)]), None)
        .unwrap();
    assert_close(eu, -1.0);
}

#[test]
fn test_five_node_expected_utility_regressions() {
    let five_node = model("five_node_cid");
    let eu = five_node
        .expected_utility(&assignment([("D", 0), ("S1", 0), ("S2", 0)]), None)
        .unwrap();
    assert_close(eu, 2.0);
    let eu = five_node
        .expected_utility(&assignment([("D", 0), ("S1", 0), ("S2", 1)]), None)
        .unwrap();
    assert_close(eu, 1.0);
}

#[test]
fn test_query_requires_relevant_policy() {
    let mut three_node = model("three_node_cid");

    // D has no policy and drives U
    let err = three_node.query(&["U"], &Assignment::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inference);

    // Observing a decision without a policy is not allowed in a query
    let err = three_node
        .query(&["U"], &assignment([("D", -1)]))
        .unwrap_err();
    assert!(matches!(err, Error::MissingPolicy { .. }));

    three_node.impute_uniform_policy().unwrap();
    let posterior = three_node.query(&["U"], &Assignment::new()).unwrap();
    let marginal = posterior.marginal("U").unwrap();
    assert_eq!(marginal.len(), 2);
    for (_, p) in marginal {
        assert_close(p, 0.5);
    }

    // Values outside the domain are rejected
    let err = three_node
        .query(&["U"], &assignment([("S", 0)]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inference);
}

#[test]
fn test_query_argument_errors() {
    let mut five_node = model("five_node_cid");
    five_node.impute_uniform_policy().unwrap();

    let empty: [&str; 0] = [];
    assert!(matches!(
        five_node.query(&empty, &Assignment::new()),
        Err(Error::EmptyQuery)
    ));
    assert!(matches!(
        five_node.query(&["Z"], &Assignment::new()),
        Err(Error::UnknownVariable { .. })
    ));
    assert!(matches!(
        five_node.query(&["S1"], &assignment([("S1", 0)])),
        Err(Error::TargetInEvidence { .. })
    ));
}

#[test]
fn test_minimal_cid_intervention() {
    let mut minimal = model("minimal_cid");
    minimal.impute_uniform_policy().unwrap();
    assert_close(minimal.expected_value(&["B"], &Assignment::new(), None).unwrap()[0], 0.5);

    // Non-mutating intervention on a scratch copy
    let set_one = assignment([("A", 1)]);
    assert_close(
        minimal
            .expected_value(&["B"], &Assignment::new(), Some(&set_one))
            .unwrap()[0],
        1.0,
    );
    assert_close(minimal.expected_value(&["B"], &Assignment::new(), None).unwrap()[0], 0.5);

    for a in [0, 1] {
        minimal.intervene(&assignment([("A", a)])).unwrap();
        assert_close(
            minimal.expected_value(&["B"], &Assignment::new(), None).unwrap()[0],
            f64::from(a),
        );
    }

    // The domain of A is fixed at {0, 1}
    let err = minimal.intervene(&assignment([("A", 2)])).unwrap_err();
    assert!(matches!(err, Error::InvalidIntervention { .. }));
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn test_intervention_on_decision_overrides_policy() {
    let mut five_node = model("five_node_cid");
    five_node.impute_optimal_policy().unwrap();
    assert_close(five_node.expected_utility(&Assignment::new(), None).unwrap(), 1.5);

    five_node.intervene(&assignment([("D", 1)])).unwrap();
    assert!(five_node.parents("D").is_empty());
    assert!(five_node.cpd("D").unwrap().is_deterministic());

    // D no longer tracks the signals, so each utility pays half the time
    let posterior = five_node.query(&["U1", "U2"], &Assignment::new()).unwrap();
    assert_eq!(posterior.variables()[0], "U1");
    assert_close(posterior.expectation("U1").unwrap(), 0.5);
    assert_close(five_node.expected_utility(&Assignment::new(), None).unwrap(), 1.0);
}

#[test]
fn test_evidence_probability_and_impossible_evidence() {
    let mut minimal = model("minimal_cid");
    minimal
        .impute_decision("A", TabularCpd::point_mass("A", 2, 0).unwrap())
        .unwrap();
    assert_close(
        minimal.evidence_probability(&assignment([("B", 0)])).unwrap(),
        1.0,
    );
    let err = minimal
        .query(&["A"], &assignment([("B", 1)]))
        .unwrap_err();
    assert!(matches!(err, Error::ZeroProbabilityEvidence { .. }));
}

#[test]
fn test_expected_utility_per_agent() {
    let mut game = model("basic_two_agent_acyclic");
    game.impute_uniform_policy().unwrap();
    let one = [AgentId::from(1)];
    let two = [AgentId::from(2)];
    let three = [AgentId::from(3)];
    let agent_one = game.expected_utility(&Assignment::new(), Some(&one[..])).unwrap();
    let agent_two = game.expected_utility(&Assignment::new(), Some(&two[..])).unwrap();
    let total = game.expected_utility(&Assignment::new(), None).unwrap();
    assert_close(agent_one + agent_two, total);
    // U1 pays 2 for (1,1) and 1 for (0,0) under uniform play
    assert_close(agent_one, 0.75);
    assert_close(agent_two, 0.5);
    assert!(matches!(
        game.expected_utility(&Assignment::new(), Some(&three[..])),
        Err(Error::UnknownAgent { .. })
    ));
}
