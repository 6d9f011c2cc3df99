//! Unit tests for bootstrap configuration and graceful degradation
//!
//! Uses serial_test to prevent environment variable races: tests touching
//! COSTAR_ROOT or COSTAR_TMDB_API_KEY are marked #[serial].

use costar_common::config::{
    default_root_folder, resolve_root_folder, TomlConfig, API_KEY_ENV_VAR, ROOT_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
fn test_empty_toml_uses_defaults() {
    let config = TomlConfig::parse("").unwrap();

    assert_eq!(config.database_path, PathBuf::from("costar.db"));
    assert!(config.seed_defaults);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.provider.base_url, "https://api.themoviedb.org/3");
    assert_eq!(config.provider.timeout_secs, 30);
    assert!(config.provider.api_key.is_none());
}

#[test]
fn test_full_toml_parses() {
    let config = TomlConfig::parse(
        r#"
        root_folder = "/srv/costar"
        database_path = "state/costar.db"
        seed_defaults = false

        [logging]
        level = "debug"

        [provider]
        base_url = "http://localhost:9000"
        api_key = "abc"
        timeout_secs = 5
        "#,
    )
    .unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/costar")));
    assert!(!config.seed_defaults);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.provider.base_url, "http://localhost:9000");
    assert_eq!(config.provider.timeout_secs, 5);
    assert_eq!(
        config.database_path(Path::new("/srv/costar")),
        PathBuf::from("/srv/costar/state/costar.db")
    );
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = TomlConfig::parse("seed_defaults = \"maybe\"").unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_absolute_database_path_ignores_root() {
    let config = TomlConfig::parse("database_path = \"/var/lib/costar.db\"").unwrap();
    assert_eq!(
        config.database_path(Path::new("/elsewhere")),
        PathBuf::from("/var/lib/costar.db")
    );
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let config = TomlConfig::load_or_default(Some(&missing));

    assert_eq!(config.database_path, PathBuf::from("costar.db"));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("costar.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = TomlConfig::load_or_default(Some(&path));

    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial]
fn test_cli_root_has_highest_priority() {
    env::set_var(ROOT_ENV_VAR, "/tmp/costar-env-root");
    let config = TomlConfig::parse("root_folder = \"/tmp/costar-toml-root\"").unwrap();

    let root = resolve_root_folder(Some(Path::new("/tmp/costar-cli-root")), &config);

    assert_eq!(root, PathBuf::from("/tmp/costar-cli-root"));
    env::remove_var(ROOT_ENV_VAR);
}

#[test]
#[serial]
fn test_env_root_beats_toml() {
    env::set_var(ROOT_ENV_VAR, "/tmp/costar-env-root");
    let config = TomlConfig::parse("root_folder = \"/tmp/costar-toml-root\"").unwrap();

    let root = resolve_root_folder(None, &config);

    assert_eq!(root, PathBuf::from("/tmp/costar-env-root"));
    env::remove_var(ROOT_ENV_VAR);
}

#[test]
#[serial]
fn test_toml_root_then_default() {
    env::remove_var(ROOT_ENV_VAR);

    let config = TomlConfig::parse("root_folder = \"/tmp/costar-toml-root\"").unwrap();
    assert_eq!(
        resolve_root_folder(None, &config),
        PathBuf::from("/tmp/costar-toml-root")
    );

    let config = TomlConfig::default();
    assert_eq!(resolve_root_folder(None, &config), default_root_folder());
}

#[test]
#[serial]
fn test_api_key_env_overrides_file() {
    let config = TomlConfig::parse("[provider]\napi_key = \"from-file\"").unwrap();

    env::remove_var(API_KEY_ENV_VAR);
    assert_eq!(config.provider.resolved_api_key().as_deref(), Some("from-file"));

    env::set_var(API_KEY_ENV_VAR, "from-env");
    assert_eq!(config.provider.resolved_api_key().as_deref(), Some("from-env"));

    env::remove_var(API_KEY_ENV_VAR);
}
