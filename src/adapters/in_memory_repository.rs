//! In-memory model repository for testing.
//!
//! This adapter provides a pure in-memory implementation of ModelRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    error::Error,
    model::{Macid, ModelSpec},
    ports::ModelRepository,
};

/// In-memory repository for testing.
///
/// Stores serialized models in a shared HashMap keyed by path.
///
/// # Examples
///
/// ```
/// use macid::adapters::InMemoryRepository;
/// use macid::ports::ModelRepository;
/// use macid::catalog;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let model = catalog::minimal_cid()?;
///
/// repo.save(&model, Path::new("minimal"))?;
/// let loaded = repo.load(Path::new("minimal"))?;
/// assert_eq!(loaded.node_count(), 2);
/// # Ok::<(), macid::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of models currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored models.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a model exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage().contains_key(&key)
    }
}

impl ModelRepository for InMemoryRepository {
    fn save(&self, model: &Macid, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();

        let bytes =
            rmp_serde::to_vec_named(&model.to_spec()).map_err(|e| Error::SerializationContext {
                operation: "serialize model for in-memory storage".to_string(),
                message: e.to_string(),
            })?;

        self.storage().insert(key, bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Macid> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage();

        let bytes = storage.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load model from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        let spec: ModelSpec =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize model from in-memory storage".to_string(),
                message: e.to_string(),
            })?;
        Macid::from_spec(spec)
    }
}
