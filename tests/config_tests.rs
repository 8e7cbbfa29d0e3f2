//! Configuration file and environment override tests.

mod common;

use common::{mock_registry, MOCK_DEVICES};
use pretty_assertions::assert_eq;
use rs232::config::{ConfigLoader, LogFormat};
use rs232::{ConfigError, Parity};
use serial_test::serial;
use std::env;
use tempfile::TempDir;

const SAMPLE: &str = r#"
[serial]
default_baud = 19200
default_mode = "7E1"
flow_control = true

[serial.port_aliases]
modem = "/dev/ttyMOCK2"

[logging]
level = "debug"
format = "compact"
"#;

#[test]
#[serial]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rs232.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let loader = ConfigLoader::load_from(&path).unwrap();
    let config = loader.config();

    assert_eq!(config.serial.default_baud, 19200);
    assert!(config.serial.flow_control);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(loader.config_path.as_deref(), Some(path.as_path()));
}

#[test]
#[serial]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("rs232.toml");

    let mut loader = ConfigLoader::with_defaults();
    loader.config_mut().serial.default_mode = "8O2".to_string();
    loader
        .config_mut()
        .serial
        .port_aliases
        .insert("gps".to_string(), "ttyUSB1".to_string());
    loader.save_to(&path).unwrap();

    let reloaded = ConfigLoader::load_from(&path).unwrap();
    assert_eq!(reloaded.config(), loader.config());
}

#[test]
#[serial]
fn test_save_without_path_fails() {
    let loader = ConfigLoader::with_defaults();
    assert!(matches!(loader.save(), Err(ConfigError::MissingRequired(_))));
}

#[test]
#[serial]
fn test_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rs232.toml");
    std::fs::write(&path, "[serial\ndefault_baud = ").unwrap();

    assert!(matches!(ConfigLoader::load_from(&path), Err(ConfigError::ParseError(_))));
}

#[test]
#[serial]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}

#[test]
#[serial]
fn test_explicit_config_path_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    env::set_var("RS232_CONFIG", &path);

    let loader = ConfigLoader::load().unwrap();

    env::remove_var("RS232_CONFIG");
    assert_eq!(loader.config_path.as_deref(), Some(path.as_path()));
    assert_eq!(loader.config().serial.default_baud, 19200);
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rs232.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    env::set_var("RS232_SERIAL_DEFAULT_MODE", "8N1");
    env::set_var("RS232_LOGGING_LEVEL", "warn");

    let loader = ConfigLoader::load_from(&path);

    env::remove_var("RS232_SERIAL_DEFAULT_MODE");
    env::remove_var("RS232_LOGGING_LEVEL");
    let config = loader.unwrap().into_config();
    assert_eq!(config.serial.default_mode, "8N1");
    assert_eq!(config.serial.default_baud, 19200);
    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial]
fn test_invalid_env_override_fails_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rs232.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    env::set_var("RS232_SERIAL_FLOW_CONTROL", "maybe");

    let result = ConfigLoader::load_from(&path);

    env::remove_var("RS232_SERIAL_FLOW_CONTROL");
    assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
}

#[test]
#[serial]
fn test_open_port_from_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rs232.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    let config = ConfigLoader::load_from(&path).unwrap().into_config();

    let settings = config.serial.port_settings().unwrap();
    assert_eq!(settings.format.parity, Parity::Even);

    let mut ports = mock_registry();
    let index = ports.find_port_index(config.serial.resolve_port("modem")).unwrap();
    assert_eq!(index, 2);

    ports.open_with(index, &settings).unwrap();
    assert_eq!(ports.settings(index), Some(&settings));
    assert_eq!(ports.device_name(index), Ok(MOCK_DEVICES[2]));
}
