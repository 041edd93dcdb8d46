//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_overlay_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, overlay_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[bridge]
standalone = true
call_timeout_ms = 2500

[dialogs]
date_format = "YYYY-MM-DD"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert!(config.bridge.standalone);
    assert_eq!(config.bridge.call_timeout_ms, 2500);
    assert_eq!(config.dialogs.date_format, "YYYY-MM-DD");
    // Defaults preserved
    assert_eq!(config.transitions.form_reset_ms, 200);
    assert_eq!(config.text_ui.default_position, "right-center");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, overlay_common::ConfigError::ParseError(_)));
}

#[test]
fn load_out_of_range_values_still_returns_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[bridge]
call_timeout_ms = 1
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.bridge.call_timeout_ms, 1);
}

#[test]
fn create_default_config_writes_parseable_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.transitions.dialog_exit_ms, 150);
    assert!(!config.bridge.standalone);
}

#[test]
fn default_config_path_ends_with_overlay_config() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("overlay/config.toml"));
    }
}
