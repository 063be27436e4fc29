//! Configuration and graceful degradation tests
//!
//! Covers:
//! - Missing TOML files do not cause errors
//! - Root folder resolution priority (CLI → ENV → TOML → default)
//! - Automatic root folder creation
//! - Backward-compatible TOML parsing
//!
//! Tests that touch VMC_ROOT_FOLDER or VMC_ROOT are marked #[serial] so they
//! never race each other on process environment.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use vmc_common::config::{
    CompiledDefaults, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
};

fn clear_root_env() {
    env::remove_var("VMC_ROOT_FOLDER");
    env::remove_var("VMC_ROOT");
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.ends_with("vmc") || defaults.root_folder.ends_with("vmc_data"));
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.catalog_file, "DataQt.txt");
    assert_eq!(defaults.report_file, "Index.html");
}

#[test]
#[serial]
fn test_resolver_cli_arg_wins() {
    env::set_var("VMC_ROOT_FOLDER", "/tmp/vmc-env-should-lose");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/vmc-cli")));
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/vmc-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_var_vmc_root_folder() {
    clear_root_env();
    env::set_var("VMC_ROOT_FOLDER", "/tmp/vmc-test-env-folder");

    let resolver = RootFolderResolver::new("test-module");
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/vmc-test-env-folder"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_vmc_root_folder_takes_precedence() {
    clear_root_env();
    env::set_var("VMC_ROOT_FOLDER", "/tmp/vmc-priority-1");
    env::set_var("VMC_ROOT", "/tmp/vmc-priority-2");

    let resolver = RootFolderResolver::new("test-module");
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/vmc-priority-1"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_missing_config_file_does_not_error() {
    clear_root_env();

    let resolver = RootFolderResolver::new("nonexistent-test-module-12345");
    let root_folder = resolver.resolve();

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
fn test_initializer_creates_nested_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("level1").join("level2");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();
    // Second call is a no-op
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.catalog_path(None), root.join("DataQt.txt"));
    assert!(!initializer.catalog_path(None).exists());
}

#[test]
fn test_backward_compatible_missing_fields() {
    let toml_str = r#"
        root_folder = "/videos"
        [logging]
        level = "debug"
    "#;

    let config: TomlConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/videos")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.catalog_file, None);
    assert_eq!(config.report_file, None);
    assert!(!config.atomic_writes);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let err = TomlConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
fn test_logging_section_defaults_level() {
    let config: TomlConfig = toml::from_str("[logging]\n").unwrap();
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_from_defaults_spells_out_every_key() {
    let defaults = CompiledDefaults::for_current_platform();
    let config = TomlConfig::from_defaults(&defaults);

    assert_eq!(config.root_folder, Some(defaults.root_folder.clone()));
    assert_eq!(config.catalog_file, Some(PathBuf::from("DataQt.txt")));
    assert_eq!(config.report_file, Some(PathBuf::from("Index.html")));
    assert_eq!(config.logging.level, defaults.log_level);
    assert!(!config.atomic_writes);

    let text = toml::to_string_pretty(&config).unwrap();
    assert!(text.contains("catalog_file"));
    assert!(text.contains("[logging]"));
}

#[test]
fn test_legacy_log_file_key_is_ignored() {
    let toml_str = r#"
        [logging]
        level = "warn"
        log_file = "/var/log/vmc.log"
    "#;

    let config: TomlConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.logging.level, "warn");
}

#[test]
#[cfg(unix)]
fn test_load_accepts_loose_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shared.toml");
    std::fs::write(&path, "atomic_writes = true\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    // Loose permissions only warn
    let config = TomlConfig::load(&path).unwrap();
    assert!(config.atomic_writes);
}
