//! JSON implementation of the model repository.
//!
//! Writes pretty-printed JSON, which doubles as the hand-editable model format
//! for the command line.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    Result,
    error::Error,
    model::{Macid, ModelSpec},
    ports::ModelRepository,
};

/// JSON-based model repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository;

impl JsonRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for JsonRepository {
    fn save(&self, model: &Macid, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &model.to_spec())?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("write file {path:?}"),
            source,
        })?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Macid> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        let spec: ModelSpec = serde_json::from_reader(BufReader::new(file))?;
        Macid::from_spec(spec)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{catalog, error::ErrorKind};

    #[test]
    fn test_json_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("three_node.json");

        let repo = JsonRepository::new();
        let model = catalog::three_node_cid().expect("Failed to build model");
        repo.save(&model, &file_path).expect("Failed to save");

        let loaded = repo.load(&file_path).expect("Failed to load");
        assert_eq!(loaded.to_spec(), model.to_spec());
    }

    #[test]
    fn test_hand_written_model_is_validated() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("broken.json");
        fs::write(
            &file_path,
            r#"{"nodes": [{"id": "D", "kind": "decision", "domain": [0, 1]}]}"#,
        )
        .expect("Failed to write");

        let err = JsonRepository::new().load(&file_path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
    }

    #[test]
    fn test_malformed_json_is_io_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("garbage.json");
        fs::write(&file_path, "not json").expect("Failed to write");

        let err = JsonRepository::new().load(&file_path).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
