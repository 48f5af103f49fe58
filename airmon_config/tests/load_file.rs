use airmon_config::{TransportMode, load_file};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_and_validates_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("airmon.toml");
    fs::write(
        &path,
        "[upload]\napi_key = \"K\"\n[transport]\nmode = \"live\"\n[logging]\nrotation = \"daily\"\n",
    )
    .unwrap();

    let cfg = load_file(&path).expect("load config");
    assert_eq!(cfg.transport.mode, TransportMode::Live);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn missing_file_mentions_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let err = load_file(&path).expect_err("missing file");
    assert!(format!("{err}").contains("nope.toml"));
}

#[test]
fn invalid_rotation_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("airmon.toml");
    fs::write(&path, "[upload]\napi_key = \"K\"\n[logging]\nrotation = \"weekly\"\n").unwrap();
    let err = load_file(&path).expect_err("weekly rotation is not supported");
    assert!(format!("{err}").contains("logging.rotation"));
}
