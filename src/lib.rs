//! Multi-agent causal influence diagrams (MACIDs)
//!
//! This crate provides:
//! - Typed DAG models with chance, decision and utility nodes owned by agents
//! - Tabular CPDs and exact inference by variable elimination
//! - Causal interventions by graph surgery
//! - Decision-rule enumeration, scoring and policy imputation
//! - Reachability, relevance-graph, mechanism-graph and sufficient-recall
//!   analysis
//! - Example and random models, JSON/MessagePack persistence and CSV export
//!
//! # Example
//!
//! ```
//! use macid::{Macid, Value, types::assignment};
//!
//! let model = Macid::builder()
//!     .chance("S", [-1, 1])
//!     .decision("D", 1, [-1, 1])
//!     .utility("U", 1, [-1, 1])
//!     .edges([("S", "D"), ("S", "U"), ("D", "U")])
//!     .uniform("S")
//!     .function("U", |p| {
//!         Value::from(p.iter().filter_map(Value::as_i64).product::<i64>())
//!     })
//!     .build()?;
//!
//! let posterior = model.query(&["U"], &assignment([("D", -1), ("S", -1)]))?;
//! let p = posterior.probability(&assignment([("U", 1)])).unwrap_or(0.0);
//! assert!((p - 1.0).abs() < 1e-12);
//! # Ok::<(), macid::Error>(())
//! ```

pub mod adapters;
pub mod analysis;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod cpd;
pub mod error;
pub mod export;
pub mod graph;
pub mod identifiers;
pub mod inference;
pub mod model;
pub mod policy;
pub mod ports;
pub mod random;
pub mod types;
pub mod utils;

pub use analysis::{MechNode, MechanismGraph, RelevanceGraph};
pub use cpd::TabularCpd;
pub use error::{Error, ErrorKind, Result};
pub use identifiers::{AgentId, NodeId};
pub use inference::{Distribution, Factor};
pub use model::{Macid, MacidBuilder, ModelSpec};
pub use types::{Assignment, NodeKind, Value};
