//! Structural strategic analysis of a [`Macid`](crate::Macid).
//!
//! None of these analyses look at CPDs; they only use the graph, node kinds
//! and owners.
//!
//! - **reachability**: s- and r-reachability between decisions and nodes
//! - **relevance**: the relevance graph over decisions and its solving order
//! - **mechanism**: the mechanism graph with one mechanism node per variable
//! - **recall**: sufficient recall per agent

pub mod mechanism;
pub mod recall;
pub mod reachability;
pub mod relevance;

pub use mechanism::{MechNode, MechanismGraph};
pub use relevance::RelevanceGraph;
