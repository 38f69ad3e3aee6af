use log::warn;

use super::ParseFailure;
use super::model::Event;
use super::srt::lines_to_ass;

// @module: WebVTT (.vtt) reader

/// Parse WebVTT content into events, in file order.
///
/// The `WEBVTT` header is mandatory. NOTE, STYLE and REGION blocks are
/// skipped, cue identifiers and cue settings are ignored. A cue whose timing
/// line cannot be read is skipped with a warning.
pub fn parse_vtt(content: &str) -> Result<Vec<Event>, ParseFailure> {
    let lines: Vec<&str> = content.lines().collect();

    let header = lines
        .first()
        .map(|l| l.trim().trim_start_matches('\u{feff}'))
        .unwrap_or("");
    if !header.starts_with("WEBVTT") {
        return Err(ParseFailure::new(1, "missing WEBVTT header"));
    }

    // Header block runs until the first blank line
    let mut i = 1;
    while i < lines.len() && !lines[i].trim().is_empty() {
        i += 1;
    }

    let mut events = Vec::new();
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }

        if line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION") {
            i = skip_block(&lines, i);
            continue;
        }

        // Optional cue identifier before the timing line
        let mut timing_index = i;
        if !line.contains("-->") {
            timing_index += 1;
            if timing_index >= lines.len() || !lines[timing_index].contains("-->") {
                warn!("Skipping VTT block without timing at line {}", i + 1);
                i = skip_block(&lines, i);
                continue;
            }
        }

        let Some((start_ms, end_ms)) = parse_timing_line(lines[timing_index]) else {
            warn!("Skipping VTT cue with invalid timing at line {}: {}", timing_index + 1, lines[timing_index].trim());
            i = skip_block(&lines, timing_index);
            continue;
        };

        let mut payload = Vec::new();
        i = timing_index + 1;
        while i < lines.len() && !lines[i].trim().is_empty() {
            payload.push(lines[i]);
            i += 1;
        }

        if payload.is_empty() {
            warn!("Skipping empty VTT cue at {}ms", start_ms);
            continue;
        }
        events.push(Event::new(start_ms, end_ms, lines_to_ass(&payload)));
    }

    Ok(events)
}

/// Index of the first line after the block starting at `start`
fn skip_block(lines: &[&str], start: usize) -> usize {
    let mut index = start + 1;
    while index < lines.len() && !lines[index].trim().is_empty() {
        index += 1;
    }
    index
}

/// Parse `start --> end [settings]`
fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into milliseconds
fn parse_timestamp(timestamp: &str) -> Option<u64> {
    let parts: Vec<&str> = timestamp.split(':').collect();
    let (hours, minutes, seconds_part) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
        [m, s] => (0, m.parse::<u64>().ok()?, *s),
        _ => return None,
    };

    let (seconds, millis) = seconds_part.split_once('.')?;
    let seconds: u64 = seconds.parse().ok()?;
    if millis.len() != 3 || minutes >= 60 || seconds >= 60 {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?
        .checked_mul(1000)?
        .checked_add(millis)
}
