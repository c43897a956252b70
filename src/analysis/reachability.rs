//! Strategic reachability between decisions.
//!
//! A node `V` is r-reachable from a decision `D` when a new parent of `V`
//! would be d-connected to some utility of `D`'s owner that descends from
//! `D`, given `D` and its parents. If so, the owner of `D` may need to know
//! how `V` is generated to choose `D` optimally. s-reachability is the same
//! test between two decisions.

use std::collections::BTreeSet;

use crate::{
    Result,
    error::Error,
    graph::is_d_connected_via_new_parent,
    identifiers::NodeId,
    model::Macid,
    types::NodeKind,
};

impl Macid {
    /// Whether `decision`'s owner strategically relies on `node`.
    ///
    /// # Errors
    ///
    /// - [`Error::WrongNodeKind`] if `decision` is not a decision node
    /// - [`Error::UnknownNode`] if either node does not exist
    pub fn is_r_reachable(&self, decision: &str, node: &str) -> Result<bool> {
        let owner = self
            .require_kind(decision, NodeKind::Decision)?
            .agent()
            .cloned()
            .ok_or_else(|| Error::UnknownAgent {
                agent: format!("owner of '{decision}'"),
            })?;
        self.require_node(node)?;

        let downstream = self.dag().descendants(decision);
        let targets: BTreeSet<NodeId> = self
            .agent_utilities(&owner)
            .into_iter()
            .filter(|utility| downstream.contains(utility))
            .collect();

        let mut family: BTreeSet<NodeId> = self.parents(decision).into_iter().collect();
        family.insert(NodeId::new(decision));

        Ok(is_d_connected_via_new_parent(
            self.dag(),
            &NodeId::new(node),
            &targets,
            &family,
        ))
    }

    /// Whether decision `other` is s-reachable from `decision`, i.e. the owner
    /// of `decision` strategically relies on the policy at `other`.
    ///
    /// # Errors
    ///
    /// [`Error::WrongNodeKind`] / [`Error::UnknownNode`] unless both arguments
    /// are decision nodes.
    pub fn is_s_reachable(&self, decision: &str, other: &str) -> Result<bool> {
        self.require_kind(other, NodeKind::Decision)?;
        self.is_r_reachable(decision, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn signalling() -> Macid {
        // D1 -> D2, both decisions affect both utilities.
        Macid::builder()
            .decision("D1", "1", [0, 1])
            .decision("D2", "2", [0, 1])
            .utility("U1", "1", [0, 1])
            .utility("U2", "2", [0, 1])
            .edges([
                ("D1", "D2"),
                ("D1", "U1"),
                ("D1", "U2"),
                ("D2", "U2"),
                ("D2", "U1"),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn s_reachability_is_asymmetric() {
        let model = signalling();
        assert!(model.is_s_reachable("D1", "D2").unwrap());
        assert!(!model.is_s_reachable("D2", "D1").unwrap());
    }

    #[test]
    fn observed_node_is_not_reachable_without_collider() {
        let model = signalling();
        // D1 is a parent of D2, so D2's owner already observes it.
        assert!(!model.is_r_reachable("D2", "D1").unwrap());
    }

    #[test]
    fn arguments_are_validated() {
        let model = signalling();
        let err = model.is_s_reachable("U1", "D2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        let err = model.is_r_reachable("D1", "Nope").unwrap_err();
        assert!(matches!(err, Error::UnknownNode { .. }));
    }
}
