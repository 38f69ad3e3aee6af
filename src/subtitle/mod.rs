/*!
 * Subtitle document model and codec.
 *
 * This module contains:
 * - `model`: the in-memory document (metadata, styles, events)
 * - `srt`, `vtt`, `ass`: format readers, plus the ASS writer
 * - `codec`: extension-dispatched load/save and the styling rules applied to
 *   every converted document
 */

pub mod ass;
pub mod codec;
pub mod model;
pub mod srt;
pub mod vtt;

pub use codec::{StyleParams, apply_style, load, save};
pub use model::{AssColor, DEFAULT_STYLE, Event, Metadata, StyleRecord, SubtitleDocument, SubtitleFormat};

/// Position and reason of a parse failure, before it is tied to a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// 1-indexed line number
    pub line: usize,
    pub message: String,
}

impl ParseFailure {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
