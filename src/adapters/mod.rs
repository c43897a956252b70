//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod in_memory_repository;
pub mod json_repository;
pub mod msgpack_repository;

use std::path::Path;

pub use in_memory_repository::InMemoryRepository;
pub use json_repository::JsonRepository;
pub use msgpack_repository::MsgPackRepository;

use crate::{Result, error::Error, model::Macid, ports::ModelRepository};

/// Repository matching the file extension of `path`.
///
/// `.msgpack` and `.mpk` select MessagePack, `.json` selects JSON.
pub fn repository_for(path: &Path) -> Result<Box<dyn ModelRepository + Send + Sync>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Box::new(JsonRepository::new())),
        Some("msgpack" | "mpk") => Ok(Box::new(MsgPackRepository::new())),
        _ => Err(Error::InvalidConfiguration {
            message: format!("cannot infer model format from {path:?}; use .json or .msgpack"),
        }),
    }
}

/// Repository choosing the format per path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionRepository;

impl ModelRepository for ExtensionRepository {
    fn save(&self, model: &Macid, path: &Path) -> Result<()> {
        repository_for(path)?.save(model, path)
    }

    fn load(&self, path: &Path) -> Result<Macid> {
        repository_for(path)?.load(path)
    }
}
