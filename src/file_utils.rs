use anyhow::{Context, Result, anyhow};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::subtitle::SubtitleFormat;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Whether the path has a .srt, .vtt or .ass extension (any case)
    pub fn is_supported_subtitle<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(SubtitleFormat::from_extension)
            .is_some()
    }

    /// Find supported subtitle files in a directory, recursively
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_supported_subtitle(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand inputs (files or directories) into a sorted, de-duplicated file list
    pub fn collect_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
        let mut files = BTreeSet::new();

        for input in inputs {
            let input = input.as_ref();
            if input.is_dir() {
                files.extend(Self::find_subtitle_files(input)?);
            } else if input.is_file() {
                if !Self::is_supported_subtitle(input) {
                    return Err(anyhow!("Unsupported subtitle file: {:?}", input));
                }
                files.insert(input.to_path_buf());
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", input));
            }
        }

        Ok(files.into_iter().collect())
    }

    // @generates: `<output_dir>/<stem>.ass`, or next to the source without an output dir
    pub fn output_path_for<P: AsRef<Path>>(source: P, output_dir: Option<&Path>) -> PathBuf {
        let source = source.as_ref();
        let stem = source.file_stem().unwrap_or_default();

        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(SubtitleFormat::Ass.extension());

        match output_dir {
            Some(dir) => dir.join(file_name),
            None => source.with_file_name(file_name),
        }
    }
}
