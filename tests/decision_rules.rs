//! Decision-rule enumeration, optimization and policy imputation.

mod common;

use common::{assert_all_close, assert_close, distinct_values, model};
use macid::{Assignment, policy::optimal_indices};

#[test]
fn test_minimal_cid_rules() {
    let mut minimal = model("minimal_cid");
    let rules: Vec<_> = minimal.possible_decision_rules("A").unwrap().collect();
    assert_eq!(rules.len(), 2);

    let mut utilities = Vec::new();
    for rule in rules {
        minimal.add_cpd(rule).unwrap();
        minimal.check_model().unwrap();
        utilities.push(minimal.expected_utility(&Assignment::new(), None).unwrap());
    }
    assert_all_close(&distinct_values(utilities), &[0.0, 1.0]);

    let optimal = model("minimal_cid").optimal_decision_rules("A").unwrap();
    assert_eq!(optimal.len(), 1);
    assert_eq!(optimal[0].deterministic_choices(), Some(vec![1]));
}

#[test]
fn test_five_node_rule_values() {
    let mut five_node = model("five_node_cid");
    let rules: Vec<_> = five_node.possible_decision_rules("D").unwrap().collect();
    assert_eq!(rules.len(), 16);
    assert!(rules.iter().all(|rule| rule.is_deterministic()));

    let mut utilities = Vec::new();
    for rule in rules {
        five_node.add_cpd(rule).unwrap();
        five_node.check_model().unwrap();
        utilities.push(five_node.expected_utility(&Assignment::new(), None).unwrap());
    }
    assert_all_close(&distinct_values(utilities), &[0.5, 1.0, 1.5]);
}

#[test]
fn test_five_node_optimal_tie_set() {
    let five_node = model("five_node_cid");
    let optimal = five_node.optimal_decision_rules("D").unwrap();
    assert_eq!(optimal.len(), 4);

    for rule in optimal {
        let mut scored = five_node.clone();
        scored.add_cpd(rule).unwrap();
        assert_close(scored.expected_utility(&Assignment::new(), None).unwrap(), 1.5);
    }

    let mut imputed = five_node.clone();
    imputed.impute_optimal_policy().unwrap();
    assert_close(imputed.expected_utility(&Assignment::new(), None).unwrap(), 1.5);
}

#[test]
fn test_evaluations_agree_with_optimal_rules() {
    let five_node = model("five_node_cid");
    let evaluations = five_node.evaluate_decision_rules("D").unwrap();
    assert_eq!(evaluations.len(), 16);
    assert!(evaluations.iter().enumerate().all(|(i, e)| e.index == i));

    let indices = optimal_indices(&evaluations, 1e-9);
    let from_indices: Vec<_> = indices.iter().map(|&i| evaluations[i].rule.clone()).collect();
    assert_eq!(from_indices, five_node.optimal_decision_rules("D").unwrap());

    // A huge tolerance admits every rule
    assert_eq!(optimal_indices(&evaluations, 10.0).len(), 16);
}

#[test]
fn test_scoring_does_not_mutate_the_model() {
    let game = model("basic_two_agent_acyclic");
    let before = game.decisions_without_policy();
    let optimal = game.optimal_decision_rules("D1").unwrap();
    assert!(!optimal.is_empty());
    assert_eq!(game.decisions_without_policy(), before);
}

#[test]
fn test_sequential_game_is_solved_backwards() {
    let mut game = model("basic_two_agent_acyclic");
    game.impute_optimal_policy().unwrap();
    // Agent 2 copies agent 1, so agent 1 picks the high-paying action
    assert_eq!(
        game.cpd("D2").unwrap().deterministic_choices(),
        Some(vec![0, 1])
    );
    assert_eq!(game.cpd("D1").unwrap().deterministic_choices(), Some(vec![1]));
    let one = [macid::AgentId::from(1)];
    assert_close(
        game.expected_utility(&Assignment::new(), Some(&one[..])).unwrap(),
        2.0,
    );
}

#[test]
fn test_random_policy_is_reproducible() {
    let mut first = model("five_node_cid");
    let mut second = model("five_node_cid");
    first.impute_random_policy(&mut common::rng(9)).unwrap();
    second.impute_random_policy(&mut common::rng(9)).unwrap();
    assert_eq!(first.cpd("D"), second.cpd("D"));
    assert!(first.cpd("D").unwrap().is_deterministic());
}

#[test]
fn test_removing_a_policy_restores_the_rule_space() {
    let mut three_node = model("three_node_cid");
    three_node.impute_optimal_policy().unwrap();
    assert!(three_node.decisions_without_policy().is_empty());
    let removed = three_node.remove_cpd("D").unwrap();
    assert_eq!(removed.deterministic_choices(), Some(vec![0, 1]));
    assert_eq!(three_node.decisions_without_policy().len(), 1);
    three_node.impute_decision("D", removed).unwrap();
    assert_close(
        three_node.expected_utility(&Assignment::new(), None).unwrap(),
        1.0,
    );
}
