//! Model serialization support
//!
//! [`ModelSpec`] is the plain-data construction format for a [`Macid`]: typed
//! nodes with their domains and parents, plus the CPDs assigned so far.
//! Repositories persist this struct rather than the model itself, so loading
//! always goes through the same validation as incremental construction.

use serde::{Deserialize, Serialize};

use super::Macid;
use crate::{
    Result,
    cpd::TabularCpd,
    error::Error,
    identifiers::{AgentId, NodeId},
    types::{NodeKind, Value},
};

/// Current version of the serialized model format.
pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// Serializable description of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Owning agent (decision and utility nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
    pub domain: Vec<Value>,
    /// Parents in the order the CPD tables refer to them
    #[serde(default)]
    pub parents: Vec<NodeId>,
}

/// Serializable representation of a whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Version of the format (for future compatibility)
    #[serde(default = "default_version")]
    pub version: u32,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub cpds: Vec<TabularCpd>,
}

impl Macid {
    /// Snapshot the model as a [`ModelSpec`].
    ///
    /// Nodes are listed in insertion order; [`Macid::from_spec`] adds every
    /// node before replaying edges, so the order need not be topological.
    pub fn to_spec(&self) -> ModelSpec {
        let nodes = self
            .nodes()
            .iter()
            .filter_map(|id| self.node(id.as_str()))
            .map(|node| NodeSpec {
                id: node.id().clone(),
                kind: node.kind(),
                agent: node.agent().cloned(),
                domain: node.domain().to_vec(),
                parents: self.parents(node.id().as_str()),
            })
            .collect();

        ModelSpec {
            version: FORMAT_VERSION,
            nodes,
            cpds: self.cpds().cloned().collect(),
        }
    }

    /// Rebuild a model from a [`ModelSpec`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfiguration`] for an unsupported format version
    /// - Structure and validation errors exactly as raised by
    ///   [`Macid::add_node`], [`Macid::add_edge`] and [`Macid::add_cpd`]
    pub fn from_spec(spec: ModelSpec) -> Result<Self> {
        if spec.version > FORMAT_VERSION {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "model format version {} is newer than supported version {FORMAT_VERSION}",
                    spec.version
                ),
            });
        }

        let mut model = Macid::new();
        let mut edges = Vec::new();
        for node in spec.nodes {
            edges.extend(
                node.parents
                    .iter()
                    .map(|parent| (parent.clone(), node.id.clone())),
            );
            model.add_node(node.id, node.kind, node.agent, node.domain)?;
        }
        for (from, to) in &edges {
            model.add_edge(from.as_str(), to.as_str())?;
        }
        model.add_cpds(spec.cpds)?;
        Ok(model)
    }
}

impl From<&Macid> for ModelSpec {
    fn from(model: &Macid) -> Self {
        model.to_spec()
    }
}

impl TryFrom<ModelSpec> for Macid {
    type Error = Error;

    fn try_from(spec: ModelSpec) -> Result<Self> {
        Macid::from_spec(spec)
    }
}
