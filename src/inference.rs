//! Exact probabilistic inference over a [`Macid`](crate::Macid).
//!
//! - **factor**: dense factor tables with product, marginalization and
//!   conditioning
//! - **engine**: queries, interventions and expected values, implemented as
//!   methods on the model

pub mod engine;
pub mod factor;

pub use engine::Distribution;
pub use factor::Factor;
