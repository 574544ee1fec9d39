//! Integration tests for configuration loading

use std::time::Duration;

use clipsync::Config;

use super::helpers::temp_file;

#[test]
fn partial_file_keeps_other_defaults() {
    let (temp_dir, path) = temp_file("config.toml", "[sync]\nseek_timeout_ms = 250\n");
    let config = Config::load_from(&path).expect("Should load config");

    assert_eq!(config.sync.seek_timeout(), Duration::from_millis(250));
    assert_eq!(config.sync.seek_poll_interval(), Duration::from_millis(1));
    assert_eq!(config.sync.loop_unwrap_ratio, 0.9);

    drop(temp_dir);
}

#[test]
fn empty_file_is_all_defaults() {
    let (temp_dir, path) = temp_file("config.toml", "");
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    drop(temp_dir);
}

#[test]
fn out_of_range_values_are_rejected() {
    let (temp_dir, path) = temp_file("config.toml", "[sync]\nloop_unwrap_ratio = 1.5\n");
    let err = Config::load_from(&path).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Invalid config file"), "{}", message);
    assert!(message.contains("loop_unwrap_ratio"), "{}", message);
    drop(temp_dir);
}

#[test]
fn saved_config_loads_back() {
    let (temp_dir, _) = temp_file("unused", "");
    let path = temp_dir.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.sync.drift_check_interval_secs = 0.5;

    config.save_to(&path).expect("Should save config");

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.sync.drift_check_interval_secs, 0.5);
}
