//! Typed influence-diagram model
//!
//! This module provides the MACID data model: typed nodes owned by agents, the
//! acyclic structure connecting them, and the CPDs attached to each node.

pub mod builder;
pub mod macid;
pub mod serialization;

pub use builder::MacidBuilder;
pub use macid::{Macid, Node};
pub use serialization::{ModelSpec, NodeSpec};
