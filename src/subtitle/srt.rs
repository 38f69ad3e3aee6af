use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::model::Event;

// @module: SubRip (.srt) reader

// @const: SRT timing line, comma or dot before the milliseconds
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})")
        .unwrap()
});

// @const: Basic HTML formatting tags found in SRT and VTT cues
static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(/?)([a-zA-Z][^>\s]*)[^>]*>").unwrap());

/// Parse SRT content into events, in file order.
///
/// Malformed blocks are skipped with a warning; cues are neither sorted nor
/// renumbered.
pub fn parse_srt(content: &str) -> Vec<Event> {
    let mut events = Vec::new();

    let mut current_timing: Option<(u64, u64)> = None;
    let mut current_lines: Vec<&str> = Vec::new();

    let mut flush = |timing: Option<(u64, u64)>, lines: &mut Vec<&str>| {
        if let Some((start_ms, end_ms)) = timing {
            if lines.is_empty() {
                warn!("Skipping empty subtitle cue at {}ms", start_ms);
            } else {
                events.push(Event::new(start_ms, end_ms, lines_to_ass(lines)));
            }
        }
        lines.clear();
    };

    for (line_index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim_start_matches('\u{feff}').trim_end();

        if line.trim().is_empty() {
            flush(current_timing.take(), &mut current_lines);
            continue;
        }

        if let Some(caps) = TIMESTAMP_REGEX.captures(line) {
            // A timing line without a separating blank line still starts a new cue
            if current_timing.is_some() {
                // The previous line was the sequence number of this cue
                if current_lines.last().is_some_and(|l| l.trim().parse::<usize>().is_ok()) {
                    current_lines.pop();
                }
                flush(current_timing.take(), &mut current_lines);
            }
            current_timing = Some((captures_to_ms(&caps, 1), captures_to_ms(&caps, 5)));
            continue;
        }

        if current_timing.is_some() {
            current_lines.push(line);
        } else if line.trim().parse::<usize>().is_err() {
            warn!("Unexpected text at line {} before a timing line: {}", line_index + 1, line);
        }
    }
    flush(current_timing.take(), &mut current_lines);

    events
}

/// Convert captured `H:MM:SS,mmm` groups starting at `start_idx` to milliseconds
fn captures_to_ms(caps: &Captures, start_idx: usize) -> u64 {
    let field = |offset: usize| -> u64 {
        caps.get(start_idx + offset)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0))
    };
    let millis_text = caps.get(start_idx + 3).map_or("0", |m| m.as_str());
    // "5" after the separator means 500ms, not 5ms
    let millis = field(3) * 10u64.pow(3 - millis_text.len().min(3) as u32);

    (field(0) * 3600 + field(1) * 60 + field(2)) * 1000 + millis
}

/// Join cue lines into ASS event text, translating basic HTML tags
pub(crate) fn lines_to_ass(lines: &[&str]) -> String {
    let joined = lines.iter().map(|l| l.trim()).collect::<Vec<_>>().join("\\N");
    html_to_ass(&joined)
}

/// Map `<i> <b> <u> <s>` to ASS override tags and drop every other tag
pub(crate) fn html_to_ass(text: &str) -> String {
    HTML_TAG_REGEX
        .replace_all(text, |caps: &Captures| {
            let closing = !caps[1].is_empty();
            let tag = caps[2].to_ascii_lowercase();
            match tag.as_str() {
                "i" | "b" | "u" | "s" => format!("{{\\{}{}}}", tag, if closing { 0 } else { 1 }),
                _ => String::new(),
            }
        })
        .into_owned()
}
