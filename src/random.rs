//! Random DAGs and CIDs for testing.
//!
//! Nodes are indexed and edges only point forward in index order, which keeps
//! every generated graph acyclic by construction.

use rand::{Rng, seq::IndexedRandom};
use tracing::debug;

use crate::{
    Result,
    cpd::TabularCpd,
    error::Error,
    graph::Dag,
    identifiers::NodeId,
    model::Macid,
    types::{NodeKind, Value},
    utils,
};

/// Edge probability used by [`random_cid`].
pub const CID_EDGE_DENSITY: f64 = 0.4;

/// In-degree cap used by [`random_cid`].
pub const CID_MAX_IN_DEGREE: usize = 3;

/// Agent owning every node of a generated CID.
pub const RANDOM_AGENT: &str = "0";

fn forward_edges<R: Rng>(
    count: usize,
    density: f64,
    max_in_degree: usize,
    allowed: impl Fn(usize, usize) -> bool,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for to in 1..count {
        let mut in_degree = 0;
        for from in 0..to {
            if in_degree == max_in_degree {
                break;
            }
            if allowed(from, to) && rng.random_bool(density) {
                edges.push((from, to));
                in_degree += 1;
            }
        }
    }
    edges
}

fn check_density(density: f64) -> Result<()> {
    if (0.0..=1.0).contains(&density) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("edge density must be within [0, 1], got {density}"),
        })
    }
}

/// Random DAG over nodes `X0..X{n-1}`.
///
/// Each forward pair is connected with probability `density`, and no node
/// gets more than `max_in_degree` parents.
pub fn random_dag<R: Rng>(
    n: usize,
    density: f64,
    max_in_degree: usize,
    rng: &mut R,
) -> Result<Dag> {
    check_density(density)?;
    let names: Vec<NodeId> = (0..n).map(|i| NodeId::new(format!("X{i}"))).collect();
    let edges = forward_edges(n, density, max_in_degree, |_, _| true, rng)
        .into_iter()
        .map(|(from, to)| (names[from].clone(), names[to].clone()));
    Dag::from_edges(names.iter().cloned(), edges)
}

fn random_row<R: Rng>(cardinality: usize, rng: &mut R) -> Vec<f64> {
    let weights: Vec<f64> = (0..cardinality)
        .map(|_| rng.random::<f64>() + f64::EPSILON)
        .collect();
    utils::normalize_weights(weights).unwrap_or_else(|| utils::uniform(cardinality))
}

/// Random single-agent CID that passes [`Macid::check_model`].
///
/// The last `n_utilities` nodes are utilities without children; decisions are
/// scattered over the remaining positions and each one is connected to at
/// least one utility. All domains are binary. Chance and utility CPDs are
/// random distributions and decisions get random deterministic rules.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] if there are no utilities or more
/// decisions and utilities than nodes.
pub fn random_cid<R: Rng>(
    n_all: usize,
    n_decisions: usize,
    n_utilities: usize,
    rng: &mut R,
) -> Result<Macid> {
    if n_utilities == 0 {
        return Err(Error::InvalidConfiguration {
            message: "a CID needs at least one utility node".to_string(),
        });
    }
    if n_decisions + n_utilities > n_all {
        return Err(Error::InvalidConfiguration {
            message: format!(
                "{n_decisions} decisions and {n_utilities} utilities do not fit in {n_all} nodes"
            ),
        });
    }

    let first_utility = n_all - n_utilities;
    let mut kinds = vec![NodeKind::Chance; first_utility];
    let positions: Vec<usize> = (0..first_utility).collect();
    for &slot in positions.choose_multiple(rng, n_decisions) {
        kinds[slot] = NodeKind::Decision;
    }
    kinds.extend(std::iter::repeat_n(NodeKind::Utility, n_utilities));

    let names: Vec<NodeId> = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let prefix = match kind {
                NodeKind::Chance => "X",
                NodeKind::Decision => "D",
                NodeKind::Utility => "U",
            };
            NodeId::new(format!("{prefix}{i}"))
        })
        .collect();

    let mut model = Macid::new();
    for (name, &kind) in names.iter().zip(&kinds) {
        let agent = kind.requires_owner().then(|| RANDOM_AGENT.into());
        model.add_node(name.clone(), kind, agent, vec![Value::Int(0), Value::Int(1)])?;
    }

    let edges = forward_edges(
        n_all,
        CID_EDGE_DENSITY,
        CID_MAX_IN_DEGREE,
        |from, _| kinds[from] != NodeKind::Utility,
        rng,
    );
    for (from, to) in edges {
        model.add_edge(names[from].as_str(), names[to].as_str())?;
    }

    let utilities = &names[first_utility..];
    for (index, name) in names.iter().enumerate().take(first_utility) {
        if kinds[index] != NodeKind::Decision {
            continue;
        }
        let descendants = model.dag().descendants(name.as_str());
        if !utilities.iter().any(|u| descendants.contains(u)) {
            if let Some(utility) = utilities.choose(rng) {
                model.add_edge(name.as_str(), utility.as_str())?;
            }
        }
    }

    for (name, &kind) in names.iter().zip(&kinds) {
        if kind == NodeKind::Decision {
            continue;
        }
        let parents = model.parent_cardinalities(name.as_str())?;
        let cards: Vec<usize> = parents.iter().map(|(_, card)| *card).collect();
        let rows = (0..utils::assignment_count(&cards).unwrap_or(0))
            .map(|_| random_row(2, rng))
            .collect();
        model.add_cpd(TabularCpd::new(name.clone(), 2, parents, rows)?)?;
    }
    model.impute_random_policy(rng)?;

    debug!(
        nodes = n_all,
        decisions = n_decisions,
        utilities = n_utilities,
        edges = model.dag().edge_count(),
        "generated random CID"
    );
    Ok(model)
}

/// `n` random CIDs with sizes between (4, 1, 1) and (12, 3, 3).
pub fn random_cids<R: Rng>(n: usize, rng: &mut R) -> Result<Vec<Macid>> {
    (0..n)
        .map(|_| {
            let n_all = rng.random_range(4..=12);
            let n_utilities = rng.random_range(1..=3);
            let n_decisions = rng.random_range(1..=3usize.min(n_all - n_utilities));
            random_cid(n_all, n_decisions, n_utilities, rng)
        })
        .collect()
}
