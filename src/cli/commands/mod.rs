//! Command implementations for the `macid` binary.

pub mod catalog;
pub mod generate;
pub mod inspect;
pub mod policies;
pub mod query;
pub mod relevance;
