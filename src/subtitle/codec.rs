use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::errors::{LoadError, SaveError};

use super::ParseFailure;
use super::ass::{parse_ass, write_ass};
use super::model::{AssColor, DEFAULT_STYLE, StyleRecord, SubtitleDocument, SubtitleFormat};
use super::srt::parse_srt;
use super::vtt::parse_vtt;

// @module: Extension-dispatched load/save and document styling

/// Script Info written for documents that did not come from an ASS file
const DEFAULT_SCRIPT_INFO: [(&str, &str); 7] = [
    ("Title", "Default Aegisub file"),
    ("ScriptType", "v4.00+"),
    ("WrapStyle", "0"),
    ("ScaledBorderAndShadow", "yes"),
    ("YCbCr Matrix", "TV.601"),
    ("PlayResX", "1920"),
    ("PlayResY", "1080"),
];

/// Font and colour parameters requested for the output
#[derive(Debug, Clone)]
pub struct StyleParams {
    pub font_family: String,
    pub font_size: f32,
    /// Colour text as configured, e.g. `H00FFFFFF` or `&H00FFFFFF`
    pub primary_color: String,
    pub outline_color: String,
}

impl StyleParams {
    fn primary(&self) -> AssColor {
        AssColor::parse(&self.primary_color).unwrap_or_else(|| {
            warn!("Invalid subtitle colour '{}', using white", self.primary_color);
            AssColor::WHITE
        })
    }

    fn outline(&self) -> AssColor {
        AssColor::parse(&self.outline_color).unwrap_or_else(|| {
            warn!("Invalid outline colour '{}', using black", self.outline_color);
            AssColor::BLACK
        })
    }

    /// The `Default` style built from these parameters
    fn default_style(&self) -> StyleRecord {
        StyleRecord {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            primary_color: self.primary(),
            outline_color: self.outline(),
            shadow: 1.0,
            ..StyleRecord::new(DEFAULT_STYLE)
        }
    }
}

/// Load a subtitle file, dispatching on its extension
pub fn load(path: &Path) -> Result<SubtitleDocument, LoadError> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(SubtitleFormat::from_extension)
        .ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    let to_load_error = |failure: ParseFailure| LoadError::Parse {
        path: path.to_path_buf(),
        line: failure.line,
        message: failure.message,
    };

    let doc = match format {
        SubtitleFormat::Ass => parse_ass(&content).map_err(to_load_error)?,
        SubtitleFormat::Srt => {
            let mut doc = SubtitleDocument::new(SubtitleFormat::Srt);
            doc.events = parse_srt(&content);
            doc
        }
        SubtitleFormat::Vtt => {
            let mut doc = SubtitleDocument::new(SubtitleFormat::Vtt);
            doc.events = parse_vtt(&content).map_err(to_load_error)?;
            doc
        }
    };

    debug!(
        "Loaded {} ({}): {} events, {} styles",
        path.display(),
        format,
        doc.events.len(),
        doc.styles.len()
    );
    Ok(doc)
}

/// Apply the requested font and colours.
///
/// Documents from SRT/VTT get fresh Script Info and a single `Default` style.
/// ASS documents keep their metadata and styles; only a missing resolution
/// is filled in and the `Default` style's primary/outline colours are
/// replaced (or the style created when absent).
pub fn apply_style(doc: &mut SubtitleDocument, params: &StyleParams) {
    if doc.format != SubtitleFormat::Ass {
        doc.metadata.clear();
        for (key, value) in DEFAULT_SCRIPT_INFO {
            doc.metadata.set(key, value);
        }
        doc.styles.clear();
        doc.styles.push(params.default_style());
        return;
    }

    doc.metadata.set_if_empty("PlayResX", "1920");
    doc.metadata.set_if_empty("PlayResY", "1080");

    let primary = params.primary();
    let outline = params.outline();
    match doc.style_mut(DEFAULT_STYLE) {
        Some(style) => {
            style.primary_color = primary;
            style.outline_color = outline;
        }
        None => doc.styles.push(params.default_style()),
    }
}

/// Serialize the document as ASS to `path`, creating parent directories
pub fn save(doc: &SubtitleDocument, path: &Path) -> Result<(), SaveError> {
    let to_save_error = |source: std::io::Error| SaveError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_save_error)?;
    }
    fs::write(path, write_ass(doc)).map_err(to_save_error)?;

    debug!("Saved {} events to {}", doc.events.len(), path.display());
    Ok(())
}
