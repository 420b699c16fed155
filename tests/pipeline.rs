use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tiercloud::{from_fn, vec2cloud, vec2words, CloudConfig, Error};

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    // Four documents over three terms; docs 0-1 form cluster 0, doc 2 forms
    // cluster 1, doc 3 is unassigned.
    fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture.write(
            "Tfidf_Matrix.json",
            r#"{"shape": [4, 3], "indptr": [0, 1, 2, 3, 6],
                "indices": [0, 1, 2, 0, 1, 2], "data": [1.0, 1.0, 1.0, 0.2, 0.2, 0.2]}"#,
        );
        fixture.write("features_rev.json", r#"["apple", "banana", "cherry"]"#);
        fixture.write("c_labels.json", "[0, 0, 1]");
        fixture.write("ward_tree.json", r#"{"n_leaves": 2, "merges": [[0, 1]]}"#);
        fixture
    }

    fn write(&self, name: &str, body: &str) {
        fs::write(self.dir.path().join(name), body).unwrap();
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> CloudConfig {
        CloudConfig::new()
            .with_inputs(
                self.path("Tfidf_Matrix.json"),
                self.path("features_rev.json"),
                self.path("c_labels.json"),
                self.path("ward_tree.json"),
            )
            .with_prefix(format!("{}/out/", self.dir.path().display()))
    }
}

#[test]
fn blobs_for_every_node_in_enumeration_order() {
    let fixture = Fixture::new();
    let blobs = vec2words(&fixture.config()).unwrap();
    assert_eq!(blobs, vec!["apple banana cherry", "apple banana", "cherry"]);
}

#[test]
fn repeated_runs_are_identical() {
    let fixture = Fixture::new();
    let first = vec2words(&fixture.config()).unwrap();
    let second = vec2words(&fixture.config()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn renderer_sees_index_derived_paths() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let calls = RefCell::new(Vec::new());
    let renderer = from_fn(|blob: &str, path: &Path| {
        calls.borrow_mut().push((blob.to_string(), path.to_path_buf()));
        Ok(())
    });

    let report = vec2cloud(&config, &renderer).unwrap();

    assert!(report.is_complete());
    let calls = calls.borrow();
    let paths: Vec<&PathBuf> = calls.iter().map(|(_, p)| p).collect();
    assert_eq!(
        paths,
        vec![
            &config.output_path(0),
            &config.output_path(1),
            &config.output_path(2)
        ]
    );
    assert!(config.output_path(2).ends_with("out/cloud2.png"));
    assert_eq!(calls[2].0, "cherry");
}

#[test]
fn missing_artifact_aborts_before_rendering() {
    let fixture = Fixture::new();
    fs::remove_file(fixture.path("c_labels.json")).unwrap();

    let renderer = from_fn(|_: &str, _: &Path| panic!("renderer must not run"));
    let err = vec2cloud(&fixture.config(), &renderer).unwrap_err();

    assert!(matches!(err, Error::MissingArtifact { ref path, .. } if path.ends_with("c_labels.json")));
    assert!(!fixture.path("out").exists());
}

#[test]
fn vocabulary_width_mismatch_is_reported() {
    let fixture = Fixture::new();
    fixture.write("features_rev.json", r#"["apple", "banana"]"#);
    assert!(matches!(
        vec2words(&fixture.config()),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn assignment_longer_than_matrix_is_reported() {
    let fixture = Fixture::new();
    fixture.write("c_labels.json", "[0, 0, 1, 1, 1]");
    assert!(matches!(
        vec2words(&fixture.config()),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn tree_leaf_without_documents_is_invalid() {
    let fixture = Fixture::new();
    fixture.write(
        "ward_tree.json",
        r#"{"n_leaves": 3, "merges": [[0, 1], [3, 2]]}"#,
    );
    assert!(matches!(
        vec2words(&fixture.config()),
        Err(Error::InvalidTree { node: 2, .. })
    ));
}

#[test]
fn cyclic_tree_is_invalid() {
    let fixture = Fixture::new();
    fixture.write(
        "ward_tree.json",
        r#"{"root": 0, "nodes": [{"children": [1]}, {"children": [0]}]}"#,
    );
    let err = vec2words(&fixture.config()).unwrap_err();
    assert!(matches!(err, Error::InvalidTree { node: 0, .. }), "{err}");
}

#[cfg(feature = "png")]
#[test]
fn run_writes_one_png_per_node() {
    let fixture = Fixture::new();
    let config = fixture.config();

    let report = tiercloud::run(&config).unwrap();

    assert_eq!(report.written.len(), 3);
    for i in 0..3 {
        let img = image::open(config.output_path(i)).unwrap();
        assert_eq!((img.width(), img.height()), (800, 400));
    }
}
