/*!
 * End-to-end tests of the single-file conversion pipeline
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use subass::job::{DEGRADED_NOTE, JobStatus, run_job};
use subass::subtitle;
use subass::variant::TieredConverter;

use crate::common::mock_converters::{MockTier, TierReply};
use crate::common::{self, SAMPLE_SRT};

fn offline_converter() -> Arc<TieredConverter> {
    Arc::new(TieredConverter::new(
        MockTier::new("remote", TierReply::Fail),
        MockTier::new("local", TierReply::Fail),
    ))
}

#[tokio::test]
async fn test_run_job_withSrtSource_shouldWriteStyledAss() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", SAMPLE_SRT)?;
    let dest = temp_dir.path().join("out").join("movie.ass");

    let result = run_job(common::descriptor(&source, &dest), offline_converter()).await;

    assert_eq!(result.status, JobStatus::Success);
    assert_eq!(result.output_path.as_deref(), Some(dest.as_path()));
    assert_eq!(result.message, format!("Saved to: {}", dest.display()));
    assert!(!result.degraded);

    let doc = subtitle::load(&dest)?;
    assert_eq!(doc.events.len(), 3);
    assert_eq!(doc.style("Default").unwrap().font_family, "Noto Sans");
    assert!(source.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_job_withVariantConversion_shouldSimplifyText() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", SAMPLE_SRT)?;
    let dest = temp_dir.path().join("movie.ass");
    let remote = MockTier::new("remote", TierReply::Upper);
    let converter = Arc::new(TieredConverter::new(remote.clone(), MockTier::new("local", TierReply::Fail)));

    let mut descriptor = common::descriptor(&source, &dest);
    descriptor.convert_variant = true;
    let result = run_job(descriptor, converter).await;

    assert!(result.is_success());
    assert_eq!(remote.call_count(), 1);
    let doc = subtitle::load(&dest)?;
    assert_eq!(doc.events[2].text, "FOR TESTING PURPOSES.");
    Ok(())
}

#[tokio::test]
async fn test_run_job_withFailingTiers_shouldSucceedDegraded() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", SAMPLE_SRT)?;
    let dest = temp_dir.path().join("movie.ass");

    let mut descriptor = common::descriptor(&source, &dest);
    descriptor.convert_variant = true;
    let result = run_job(descriptor, offline_converter()).await;

    assert!(result.is_success());
    assert!(result.degraded);
    assert!(result.message.ends_with(DEGRADED_NOTE));
    assert_eq!(subtitle::load(&dest)?.events[0].text, "這是測試字幕。");
    Ok(())
}

#[tokio::test]
async fn test_run_job_withInsertion_shouldAppendCaption() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.vtt", common::SAMPLE_VTT)?;
    let dest = temp_dir.path().join("movie.ass");

    let mut descriptor = common::descriptor(&source, &dest);
    descriptor.insertion_names = vec!["intro".to_string()];
    let result = run_job(descriptor, offline_converter()).await;

    assert!(result.is_success());
    let doc = subtitle::load(&dest)?;
    assert_eq!(doc.events.len(), 3);
    assert_eq!((doc.events[2].start_ms, doc.events[2].end_ms), (1500, 3000));
    Ok(())
}

#[tokio::test]
async fn test_run_job_withBadInsertionTimestamp_shouldFailWithoutOutput() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", SAMPLE_SRT)?;
    let dest = temp_dir.path().join("movie.ass");

    let mut descriptor = common::descriptor(&source, &dest);
    descriptor.subtitle_configs[0].start_time = "1.5s".to_string();
    descriptor.insertion_names = vec!["intro".to_string()];
    descriptor.delete_original_on_success = true;
    let result = run_job(descriptor, offline_converter()).await;

    assert_eq!(result.status, JobStatus::Error);
    assert!(result.message.contains("1.5s"));
    assert!(!dest.exists());
    assert!(source.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_job_withUnsupportedSource_shouldReportLoadError() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.sub", "whatever")?;
    let dest = temp_dir.path().join("movie.ass");

    let result = run_job(common::descriptor(&source, &dest), offline_converter()).await;

    assert_eq!(result.status, JobStatus::Error);
    assert!(result.message.starts_with("unsupported format"));
    assert!(result.output_path.is_none());
    Ok(())
}

/// The source is removed only once the output has been written
#[tokio::test]
async fn test_run_job_withDeleteOriginal_shouldRemoveSourceAfterSave() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", SAMPLE_SRT)?;
    let dest = temp_dir.path().join("out").join("movie.ass");

    let mut descriptor = common::descriptor(&source, &dest);
    descriptor.delete_original_on_success = true;
    let result = run_job(descriptor, offline_converter()).await;

    assert!(result.is_success());
    assert!(dest.exists());
    assert!(!source.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_job_withSaveFailure_shouldKeepSource() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.srt", SAMPLE_SRT)?;
    // A regular file where the output directory should be
    let blocker = common::create_test_file(temp_dir.path(), "blocker", "")?;
    let dest = blocker.join("movie.ass");

    let mut descriptor = common::descriptor(&source, &dest);
    descriptor.delete_original_on_success = true;
    let result = run_job(descriptor, offline_converter()).await;

    assert_eq!(result.status, JobStatus::Error);
    assert!(source.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_job_withSourceAsDestination_shouldNotDeleteOutput() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.ass", common::SAMPLE_ASS)?;

    let mut descriptor = common::descriptor(&source, &source);
    descriptor.delete_original_on_success = true;
    let result = run_job(descriptor, offline_converter()).await;

    assert!(result.is_success());
    assert!(source.exists());
    assert_eq!(subtitle::load(&source)?.events.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_run_job_withAssSource_shouldKeepOtherStyles() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "sign.ass", common::SAMPLE_ASS)?;
    let dest = temp_dir.path().join("out.ass");

    let result = run_job(common::descriptor(&source, &dest), offline_converter()).await;

    assert!(result.is_success());
    let output = fs::read_to_string(&dest)?;
    assert!(output.contains("Style: Sign,Verdana,36,"));
    assert!(output.contains("Comment: 0,0:00:07.00,0:00:08.00,Default,,0,0,0,,note to self"));
    Ok(())
}

#[tokio::test]
async fn test_run_job_withOverflowingAssTimestamp_shouldReportLoadError() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let content = "[Events]\nDialogue: 0,99999999999999999:00:00.00,0:00:01.00,Default,,0,0,0,,x\n";
    let source = common::create_test_file(temp_dir.path(), "huge.ass", content)?;
    let dest = temp_dir.path().join("out.ass");

    let result = run_job(common::descriptor(&source, &dest), offline_converter()).await;

    assert_eq!(result.status, JobStatus::Error);
    assert!(result.message.contains("invalid start time"));
    assert!(!dest.exists());
    Ok(())
}
