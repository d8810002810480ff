/*!
 * Tests for application configuration functionality
 */

use std::time::Duration;

use novelwai::app_config::{Config, LogLevel};

use crate::common;

/// Test that a missing config file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config, Config::default());
    assert_eq!(Config::from_file(&path)?, config);
    Ok(())
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{ "primary": { "api_key": "abc", "model": "gemini-2.5-pro" }, "batch": { "delay_ms": 1500 }, "log_level": "warn" }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.primary.api_key, "abc");
    assert_eq!(config.primary.model, "gemini-2.5-pro");
    assert_eq!(config.batch.delay_ms, 1500);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_fromFile_withMalformedJson_shouldFail() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ primary: ")?;
    assert!(Config::from_file(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withEmptyModel_shouldFail() {
    let mut config = common::valid_config();
    config.primary.title_model = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_batchOptions_shouldCarryConfiguredValues() {
    let mut config = common::valid_config();
    config.primary.model = "body-model".to_string();
    config.primary.title_model = "title-model".to_string();
    config.batch.delay_ms = 250;
    config.batch.continue_on_error = true;
    config.fallback.title_concurrency = 2;

    let options = config.batch_options();

    assert_eq!(options.body_model, "body-model");
    assert_eq!(options.title_model, "title-model");
    assert_eq!(options.delay, Duration::from_millis(250));
    assert_eq!(options.title_concurrency, 2);
    assert!(options.continue_on_error);
}

#[test]
fn test_logLevel_shouldMapToFilter() {
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
