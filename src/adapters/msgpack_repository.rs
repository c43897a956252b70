//! MessagePack implementation of the model repository.
//!
//! Structs are written with field names so optional fields (such as the owner
//! of a chance node) can be omitted.

use std::{fs::File, path::Path};

use crate::{
    Result,
    error::Error,
    model::{Macid, ModelSpec},
    ports::ModelRepository,
};

/// MessagePack-based model repository.
///
/// # Examples
///
/// ```no_run
/// use macid::adapters::MsgPackRepository;
/// use macid::ports::ModelRepository;
/// use macid::catalog;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let model = catalog::five_node_cid()?;
///
/// repo.save(&model, Path::new("five_node.msgpack"))?;
/// let loaded = repo.load(Path::new("five_node.msgpack"))?;
/// # Ok::<(), macid::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for MsgPackRepository {
    fn save(&self, model: &Macid, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;

        rmp_serde::encode::write_named(&mut file, &model.to_spec()).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize model to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Macid> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let spec: ModelSpec =
            rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
                operation: "deserialize model from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        Macid::from_spec(spec)
    }
}
