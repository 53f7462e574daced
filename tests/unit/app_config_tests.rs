/*!
 * Tests for application configuration
 */

use anyhow::Result;
use elantime::app_config::{Config, LogLevel};
use elantime::timing::TimeFormat;
use crate::common;

/// Test that the default configuration is valid
#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.display.time_format, TimeFormat::MinSec);
    assert_eq!(config.export.copy_suffix, " (copy)");
    assert_eq!(config.resolution.hop_limit, None);
}

/// Test that an empty JSON object yields the defaults
#[test]
fn test_config_fromEmptyJson_shouldEqualDefault() -> Result<()> {
    let config: Config = serde_json::from_str("{}")?;

    assert_eq!(config, Config::default());
    Ok(())
}

/// Test that a config survives a write and read through a file
#[test]
fn test_config_throughFile_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.display.time_format = TimeFormat::Milliseconds;
    config.resolution.hop_limit = Some(12);
    config.log_level = LogLevel::Debug;

    let path = common::create_test_file(temp_dir.path(), "conf.json", &serde_json::to_string_pretty(&config)?)?;
    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    assert_eq!(loaded, config);
    Ok(())
}

/// Test that an empty copy suffix is rejected
#[test]
fn test_validate_withEmptyCopySuffix_shouldFail() {
    let mut config = Config::default();
    config.export.copy_suffix = "  ".to_string();

    assert!(config.validate().is_err());
}

/// Test that log levels are read in lowercase and mapped to filters
#[test]
fn test_logLevel_fromJson_shouldMapToFilter() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"log_level": "trace"}"#)?;

    assert_eq!(config.log_level, LogLevel::Trace);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Trace);
    Ok(())
}
