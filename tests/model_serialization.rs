//! Persistence of models through the repository adapters.

mod common;

use std::path::Path;

use common::{assert_close, model};
use macid::{
    Assignment, Error, ErrorKind, Macid, ModelSpec,
    adapters::{ExtensionRepository, InMemoryRepository, JsonRepository, MsgPackRepository},
    app::App,
    catalog,
    ports::ModelRepository,
};
use tempfile::TempDir;

fn solved(name: &str) -> Macid {
    let mut example = model(name);
    example.impute_optimal_policy().unwrap();
    example
}

#[test]
fn test_catalog_round_trips_in_both_formats() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo = ExtensionRepository;

    for name in catalog::MODEL_NAMES {
        let original = model(name);
        for extension in ["json", "msgpack"] {
            let path = temp_dir.path().join(format!("{name}.{extension}"));
            repo.save(&original, &path).unwrap();
            assert!(path.exists(), "{name}.{extension} should exist");
            let loaded = repo.load(&path).unwrap();
            assert_eq!(loaded.to_spec(), original.to_spec(), "{name}.{extension}");
        }
    }
}

#[test]
fn test_loaded_model_reproduces_expected_utility() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("five.msgpack");
    let original = solved("five_node_cid");

    MsgPackRepository::new().save(&original, &path).unwrap();
    let loaded = MsgPackRepository::new().load(&path).unwrap();
    loaded.check_model().unwrap();
    assert_close(
        loaded.expected_utility(&Assignment::new(), None).unwrap(),
        original.expected_utility(&Assignment::new(), None).unwrap(),
    );
}

#[test]
fn test_spec_conversions_validate() {
    let spec = ModelSpec::from(&solved("three_node_cid"));
    let rebuilt = Macid::try_from(spec.clone()).unwrap();
    assert_eq!(rebuilt.to_spec(), spec);

    // Future formats are refused
    let mut newer = spec.clone();
    newer.version += 1;
    assert!(matches!(
        Macid::from_spec(newer),
        Err(Error::InvalidConfiguration { .. })
    ));

    // A parent that does not exist is reported, not ignored
    let mut broken = spec;
    broken.nodes[0].parents.push("Ghost".into());
    assert!(Macid::from_spec(broken).is_err());
}

#[test]
fn test_unsupported_extension_and_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let example = model("minimal_cid");

    let err = ExtensionRepository
        .save(&example, &temp_dir.path().join("model.yaml"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }));

    let err = JsonRepository::new()
        .load(&temp_dir.path().join("absent.json"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_app_with_in_memory_repository() {
    let repo = InMemoryRepository::new();
    let app = App::for_testing()
        .with_repository(repo.clone())
        .with_default_seed(7)
        .build();

    let generated = app
        .generate_model(7, 2, 1, &macid::app::AnalysisConfig::new())
        .unwrap();
    app.save_model(&generated, Path::new("generated")).unwrap();
    assert!(repo.contains(Path::new("generated")));

    let loaded = app.load_model(Path::new("generated")).unwrap();
    loaded.check_model().unwrap();
    assert_eq!(loaded.to_spec(), generated.to_spec());

    assert!(app.load_model(Path::new("unknown")).is_err());
}
