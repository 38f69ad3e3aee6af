/*!
 * Tests for the application controller, from inputs to batch summary
 */

use anyhow::Result;
use std::sync::Arc;
use subass::app_config::Config;
use subass::app_controller::Controller;
use subass::variant::TieredConverter;

use crate::common::mock_converters::{MockTier, TierReply};
use crate::common::{self, SAMPLE_SRT, SAMPLE_VTT};

fn controller(config: Config) -> Result<Controller> {
    let converter = Arc::new(TieredConverter::new(
        MockTier::new("remote", TierReply::Fail),
        MockTier::new("local", TierReply::Upper),
    ));
    Controller::with_converter(config, converter)
}

#[test]
fn test_with_config_withInvalidColour_shouldFail() {
    let config = Config {
        outline_color: "black".to_string(),
        ..Config::default()
    };

    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_new_for_test_shouldUseDefaults() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().font_size, 70.0);
    Ok(())
}

#[test]
fn test_build_descriptors_shouldCopyConfiguredOptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("converted");
    let source = common::create_test_file(temp_dir.path(), "a.srt", SAMPLE_SRT)?;
    let config = Config {
        output_directory: out_dir.to_string_lossy().into_owned(),
        convert_variant: true,
        remote_priority: false,
        subtitle_configs: common::sample_configs(),
        ..Config::default()
    };

    let descriptors = controller(config)?.build_descriptors(&[source.clone()], &["intro".to_string()])?;

    assert_eq!(descriptors.len(), 1);
    let descriptor = &descriptors[0];
    assert_eq!(descriptor.source_path, source);
    assert_eq!(descriptor.dest_path, out_dir.join("a.ass"));
    assert!(descriptor.convert_variant);
    assert!(!descriptor.remote_priority);
    assert_eq!(descriptor.insertion_names, vec!["intro".to_string()]);
    assert_eq!(descriptor.subtitle_configs.len(), 2);
    assert!(out_dir.is_dir());
    Ok(())
}

#[test]
fn test_build_descriptors_withCollidingOutputs_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("converted");
    let srt = common::create_test_file(temp_dir.path(), "a.srt", SAMPLE_SRT)?;
    let vtt = common::create_test_file(temp_dir.path(), "a.vtt", SAMPLE_VTT)?;
    let config = Config {
        output_directory: out_dir.to_string_lossy().into_owned(),
        ..Config::default()
    };

    assert!(controller(config)?.build_descriptors(&[srt, vtt], &[]).is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_withDirectory_shouldConvertEverySubtitle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("input");
    std::fs::create_dir_all(&input_dir)?;
    common::create_test_file(&input_dir, "one.srt", SAMPLE_SRT)?;
    common::create_test_file(&input_dir, "two.vtt", SAMPLE_VTT)?;
    common::create_test_file(&input_dir, "readme.txt", "skip me")?;
    let out_dir = temp_dir.path().join("output");
    let config = Config {
        output_directory: out_dir.to_string_lossy().into_owned(),
        convert_variant: true,
        ..Config::default()
    };

    let summary = controller(config)?.run(&[input_dir], &[]).await?;

    assert_eq!(summary.total, 2);
    assert!(summary.all_succeeded());
    assert_eq!(summary.degraded, 0);
    assert!(out_dir.join("one.ass").exists());
    let two = std::fs::read_to_string(out_dir.join("two.ass"))?;
    assert!(two.contains("HELLO THERE"));
    Ok(())
}

#[tokio::test]
async fn test_run_withNoSubtitles_shouldReturnEmptySummary() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let summary = controller(Config::default())?.run(&[temp_dir.path().to_path_buf()], &[]).await?;

    assert_eq!(summary.total, 0);
    Ok(())
}
