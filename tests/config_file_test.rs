// Integration test for configuration file support

use rotolog::config::LoggerConfig;
use rotolog::{Level, Logger, RotologError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_full_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logger.toml");

    let toml_content = r#"
        log_dir = "/var/log/svc"
        log_file = "svc.log"
        max_size_mb = 50
        max_backups = 3
        max_age_days = 14
        compress = false
        log_level = "warn"
        local_time = false
        stacktrace = false
        console = true
    "#;

    fs::write(&config_path, toml_content).unwrap();

    let config = LoggerConfig::from_file(&config_path).unwrap();
    assert_eq!(config.log_dir, PathBuf::from("/var/log/svc"));
    assert_eq!(config.log_file, "svc.log");
    assert_eq!(config.max_size_mb, 50);
    assert_eq!(config.max_backups, 3);
    assert_eq!(config.max_age_days, 14);
    assert!(!config.compress);
    assert_eq!(config.level(), Level::Warn);
    assert!(!config.local_time);
    assert!(!config.stacktrace);
    assert!(config.console);
}

#[test]
fn test_load_json_config_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logger.json");

    fs::write(&config_path, r#"{ "log_level": "debug" }"#).unwrap();

    let config = LoggerConfig::from_file(&config_path).unwrap();
    assert_eq!(config.level(), Level::Debug);
    assert_eq!(config.log_dir, PathBuf::from("logs"));
    assert_eq!(config.log_file, "myapp.log");
    assert_eq!(config.max_size_mb, 100);
    assert_eq!(config.max_backups, 7);
    assert_eq!(config.max_age_days, 7);
    assert!(config.compress);
}

#[test]
fn test_unrecognized_level_in_file_falls_back_to_info() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logger.toml");

    fs::write(&config_path, "log_level = \"chatty\"\n").unwrap();

    let config = LoggerConfig::from_file(&config_path).unwrap();
    assert_eq!(config.log_level, "chatty");
    assert_eq!(config.level(), Level::Info);
}

#[test]
fn test_invalid_toml_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logger.toml");

    fs::write(&config_path, "max_size_mb = \"lots\"").unwrap();

    let result = LoggerConfig::from_file(&config_path);
    assert!(matches!(result, Err(RotologError::InvalidConfig(_))));
}

#[test]
fn test_config_file_validation_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logger.json");

    fs::write(&config_path, r#"{ "log_file": "" }"#).unwrap();

    let result = LoggerConfig::from_file(&config_path);
    assert!(matches!(result, Err(RotologError::ConfigValidationError(_))));
}

#[test]
fn test_missing_config_file() {
    let result = LoggerConfig::from_file(&PathBuf::from("/nonexistent/logger.toml"));
    assert!(matches!(result, Err(RotologError::ConfigError(_))));
}

#[test]
fn test_logger_from_loaded_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("logger.toml");
    let log_dir = temp_dir.path().join("out");

    fs::write(
        &config_path,
        format!(
            "[logger]\nlog_dir = {:?}\nlog_file = \"loaded.log\"\nstacktrace = false\n",
            log_dir.to_string_lossy()
        ),
    )
    .unwrap();

    let config = LoggerConfig::from_file(&config_path).unwrap();
    let logger = Logger::new(&config).unwrap();
    logger.info("configured from file", &[]);
    logger.sync().unwrap();

    let content = fs::read_to_string(log_dir.join("loaded.log")).unwrap();
    assert!(content.contains("configured from file"));
}
