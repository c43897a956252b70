//! D-separation via the Bayes-ball reachability procedure.
//!
//! A trail is explored one `(node, direction)` state at a time, where the
//! direction records whether the ball arrived from a child or from a parent.
//! Observed nodes block chains and forks; a collider passes the ball only if
//! it is observed or has an observed descendant.
//!
//! The "new parent" variants answer questions about a hypothetical extra
//! parent of some node without touching the graph: the ball simply starts at
//! that node as if it had just arrived from a parent.

use std::collections::{BTreeSet, VecDeque};

use super::Adjacency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Arrival {
    FromChild,
    FromParent,
}

/// Observed nodes together with all of their ancestors.
pub fn observed_ancestors<G: Adjacency>(
    graph: &G,
    observed: &BTreeSet<G::Node>,
) -> BTreeSet<G::Node> {
    let mut closure = BTreeSet::new();
    let mut queue: VecDeque<G::Node> = observed.iter().cloned().collect();
    while let Some(node) = queue.pop_front() {
        if !closure.contains(&node) {
            queue.extend(graph.parents_of(&node));
            closure.insert(node);
        }
    }
    closure
}

fn reachable<G: Adjacency>(
    graph: &G,
    seed: (G::Node, Arrival),
    observed: &BTreeSet<G::Node>,
) -> BTreeSet<G::Node> {
    let anc = observed_ancestors(graph, observed);
    let mut visited: BTreeSet<(G::Node, Arrival)> = BTreeSet::new();
    let mut reached = BTreeSet::new();
    let mut queue: VecDeque<(G::Node, Arrival)> = VecDeque::from([seed]);

    while let Some((node, arrival)) = queue.pop_front() {
        if !visited.insert((node.clone(), arrival)) {
            continue;
        }
        let is_observed = observed.contains(&node);
        if !is_observed {
            reached.insert(node.clone());
        }

        match arrival {
            Arrival::FromChild => {
                if !is_observed {
                    for parent in graph.parents_of(&node) {
                        queue.push_back((parent, Arrival::FromChild));
                    }
                    for child in graph.children_of(&node) {
                        queue.push_back((child, Arrival::FromParent));
                    }
                }
            }
            Arrival::FromParent => {
                if !is_observed {
                    for child in graph.children_of(&node) {
                        queue.push_back((child, Arrival::FromParent));
                    }
                }
                if anc.contains(&node) {
                    for parent in graph.parents_of(&node) {
                        queue.push_back((parent, Arrival::FromChild));
                    }
                }
            }
        }
    }

    reached
}

/// Nodes connected to `start` by an active trail given `observed`.
///
/// `start` itself is included unless it is observed (an observed start has
/// no active trails at all).
pub fn active_trail_nodes<G: Adjacency>(
    graph: &G,
    start: &G::Node,
    observed: &BTreeSet<G::Node>,
) -> BTreeSet<G::Node> {
    if !graph.contains_node(start) || observed.contains(start) {
        return BTreeSet::new();
    }
    reachable(graph, (start.clone(), Arrival::FromChild), observed)
}

/// Whether an active trail connects `a` and `b` given `observed`.
pub fn is_d_connected<G: Adjacency>(
    graph: &G,
    a: &G::Node,
    b: &G::Node,
    observed: &BTreeSet<G::Node>,
) -> bool {
    active_trail_nodes(graph, a, observed).contains(b)
}

/// Whether a new, unobserved parent of `child` would be d-connected to any of
/// `targets` given `observed`.
pub fn is_d_connected_via_new_parent<G: Adjacency>(
    graph: &G,
    child: &G::Node,
    targets: &BTreeSet<G::Node>,
    observed: &BTreeSet<G::Node>,
) -> bool {
    if !graph.contains_node(child) || targets.is_empty() {
        return false;
    }
    let reached = reachable(graph, (child.clone(), Arrival::FromParent), observed);
    targets.iter().any(|target| reached.contains(target))
}
