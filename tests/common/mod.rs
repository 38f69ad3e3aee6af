/*!
 * Common test utilities for the subass test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subass::app_config::SubtitleConfig;
use subass::job::JobDescriptor;


pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
這是測試字幕。

2
00:00:05,000 --> 00:00:09,000
第二行
<i>斜體</i>

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

pub const SAMPLE_VTT: &str = "WEBVTT

NOTE written by hand

intro
00:01.000 --> 00:04.000 align:start
Hello there

00:00:05.500 --> 00:00:07.250
General Kenobi
";

pub const SAMPLE_ASS: &str = "[Script Info]
Title: Sample
ScriptType: v4.00+
PlayResX: 1280
PlayResY: 720

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,48,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1
Style: Sign,Verdana,36,&H0000FFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,0,8,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.00,0:00:03.50,Default,,0,0,0,,Hello, world
Dialogue: 1,0:00:04.25,0:00:06.00,Sign,Narrator,0,0,0,,{\\an8}Sign text
Comment: 0,0:00:07.00,0:00:08.00,Default,,0,0,0,,note to self
";

/// Route library logs to the test output; repeated calls are ignored
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Caption blocks used across tests
pub fn sample_configs() -> Vec<SubtitleConfig> {
    vec![
        SubtitleConfig::new("intro", "00:00:01.500", "00:00:03.000", "{\\fad(200,200)}Intro"),
        SubtitleConfig::new("credits", "00:01:00.000", "00:01:05.000", "Credits"),
    ]
}

/// Descriptor with neutral options converting `source` to `dest`
pub fn descriptor(source: &Path, dest: &Path) -> JobDescriptor {
    JobDescriptor {
        source_path: source.to_path_buf(),
        dest_path: dest.to_path_buf(),
        insertion_names: Vec::new(),
        subtitle_configs: sample_configs(),
        subtitle_color: "H00FFFFFF".to_string(),
        outline_color: "H00000000".to_string(),
        delete_original_on_success: false,
        convert_variant: false,
        font_family: "Noto Sans".to_string(),
        font_size: 70.0,
        remote_priority: true,
    }
}
