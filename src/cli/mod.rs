//! CLI infrastructure for the MACID analysis toolkit
//!
//! This module provides the command-line interface for inspecting models,
//! analyzing strategic relevance, scoring decision rules, running queries
//! and writing example or random models.

pub mod commands;
pub mod config;
pub mod output;
