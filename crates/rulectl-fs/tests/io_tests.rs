//! Tests for atomic record I/O

use pretty_assertions::assert_eq;
use rulectl_fs::{ConfigStore, NormalizedPath, io};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::tempdir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sample {
    name: String,
    count: u32,
}

#[test]
fn write_atomic_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("a/b/c/record.json"));

    io::write_atomic(&path, b"{}").unwrap();

    assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "{}");
}

#[test]
fn write_atomic_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("record.json"));

    io::write_atomic(&path, b"first").unwrap();
    io::write_atomic(&path, b"second").unwrap();

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["record.json".to_string()]);
    assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "second");
}

#[test]
fn json_round_trip() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("sample.json"));
    let sample = Sample {
        name: "rules".into(),
        count: 3,
    };

    io::write_json(&path, &sample).unwrap();
    let loaded: Sample = io::read_json(&path).unwrap();

    assert_eq!(loaded, sample);
}

#[test]
fn read_json_reports_parse_errors_with_path() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("broken.json"));
    fs::write(path.to_native(), "{not json").unwrap();

    let err = io::read_json::<serde_json::Value>(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"), "got: {err}");
}

#[test]
fn remove_helpers_tolerate_missing_targets() {
    let dir = tempdir().unwrap();
    io::remove_file(&NormalizedPath::new(dir.path().join("nope.json"))).unwrap();
    io::remove_dir_all(&NormalizedPath::new(dir.path().join("nope"))).unwrap();
}

#[test]
fn list_dirs_is_sorted_and_skips_files() {
    let dir = tempdir().unwrap();
    for name in ["zeta", "alpha", "mid"] {
        fs::create_dir(dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("file.json"), "{}").unwrap();

    let names = io::list_dirs(&NormalizedPath::new(dir.path())).unwrap();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    let missing = io::list_dirs(&NormalizedPath::new(dir.path().join("missing"))).unwrap();
    assert!(missing.is_empty());
}

#[test]
fn concurrent_writers_never_interleave() {
    let dir = tempdir().unwrap();
    let path = Arc::new(NormalizedPath::new(dir.path().join("contended.json")));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..20 {
                    io::write_json(&*path, &json!({"writer": id, "write": i})).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread should not panic");
    }

    // Whatever won, it must be one whole document.
    let value: serde_json::Value = io::read_json(&path).unwrap();
    assert!(value.get("writer").is_some());
    assert!(value.get("write").is_some());
}

#[test]
fn config_store_handles_toml_and_json() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new();
    let sample = Sample {
        name: "cfg".into(),
        count: 7,
    };

    for file in ["settings.toml", "settings.json"] {
        let path = NormalizedPath::new(dir.path().join(file));
        store.save(&path, &sample).unwrap();
        let loaded: Sample = store.load(&path).unwrap();
        assert_eq!(loaded, sample);
    }
}

#[test]
fn config_store_rejects_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("settings.ini"));
    let err = ConfigStore::new()
        .save(&path, &Sample { name: "x".into(), count: 0 })
        .unwrap_err();
    assert!(matches!(err, rulectl_fs::Error::UnsupportedFormat { .. }));
}
