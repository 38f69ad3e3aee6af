/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use subass::app_config::{Config, LogLevel, SubtitleConfig};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.font_family, "方正粗圆_GBK");
    assert_eq!(config.font_size, 70.0);
    assert_eq!(config.subtitle_color, "H00FFFFFF");
    assert_eq!(config.outline_color, "H00000000");
    assert!(!config.delete_original);
    assert!(!config.convert_variant);
    assert!(config.remote_priority);
    assert_eq!(config.variant.endpoint, "https://api.zhconvert.org/convert");
    assert_eq!(config.variant.timeout_secs, 10);
    assert_eq!(config.variant.proxies.len(), 2);
    assert!(config.variant.local_enabled);
    assert_eq!(config.max_concurrent_jobs, None);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.subtitle_color = "white".to_string();
    assert!(config.validate().is_err());
    config.subtitle_color = "&H0000FFFF".to_string();
    assert!(config.validate().is_ok());

    config.font_size = 0.0;
    assert!(config.validate().is_err());
    config.font_size = 48.0;

    config.variant.proxies.push("not a url".to_string());
    assert!(config.validate().is_err());
    config.variant.proxies.pop();

    config.variant.timeout_secs = 0;
    assert!(config.validate().is_err());
    config.variant.timeout_secs = 5;

    config.max_concurrent_jobs = Some(0);
    assert!(config.validate().is_err());
    config.max_concurrent_jobs = Some(2);

    config.subtitle_configs = common::sample_configs();
    assert!(config.validate().is_ok());

    config.subtitle_configs.push(SubtitleConfig::new("intro", "00:00:00.000", "00:00:01.000", "dup"));
    assert!(config.validate().is_err());
    config.subtitle_configs.pop();

    config.subtitle_configs.push(SubtitleConfig::new("late", "00:00:00.000", "00:61:00.000", "x"));
    assert!(config.validate().is_err());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.font_size, 70.0);
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.variant.proxies, config.variant.proxies);
    Ok(())
}

/// Missing keys fall back to their defaults
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "font_size": 52,
            "convert_variant": true,
            "subtitle_configs": [
                {"name": "intro", "start_time": "00:00:01.500", "end_time": "00:00:03.000", "ass_statement": "Hi"}
            ],
            "variant": {"proxies": []},
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.font_size, 52.0);
    assert!(config.convert_variant);
    assert_eq!(config.font_family, "方正粗圆_GBK");
    assert_eq!(config.subtitle_configs[0].ass_statement, "Hi");
    assert!(config.variant.proxies.is_empty());
    assert_eq!(config.variant.timeout_secs, 10);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let error = Config::load_or_create(&path).unwrap_err();

    assert!(error.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_output_dir_withEmptyValue_shouldBeNone() {
    let mut config = Config::default();
    assert_eq!(config.output_dir(), None);

    config.output_directory = "/tmp/subs".to_string();
    assert_eq!(config.output_dir(), Some(std::path::PathBuf::from("/tmp/subs")));
}

#[test]
fn test_log_level_to_level_filter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
