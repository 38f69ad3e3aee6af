/*!
 * Supplemental event injection.
 *
 * Appends the configured caption blocks selected by name to a document, on
 * the Default style. The blocks are added after the existing events in the
 * order the names were given; nothing is re-sorted.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::SubtitleConfig;
use crate::errors::InjectionError;
use crate::subtitle::{Event, SubtitleDocument};

/// Names that select no insertion at all
pub const NO_INSERTION: [&str; 2] = ["none", "不插入字幕"];

static CONFIG_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})\.(\d{3})$").unwrap());

/// True when `name` is one of the "no insertion" choices
pub fn is_no_insertion(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case(NO_INSERTION[0]) || name == NO_INSERTION[1]
}

/// Parse an `HH:MM:SS.mmm` timestamp into milliseconds
pub fn parse_config_time(value: &str) -> Option<u64> {
    let caps = CONFIG_TIME_REGEX.captures(value.trim())?;
    let field = |i: usize| caps[i].parse::<u64>().ok();

    let (hours, minutes, seconds, millis) = (field(1)?, field(2)?, field(3)?, field(4)?);
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
}

/// Append one event per selected caption block.
///
/// Unknown names are skipped; when several configs share a name the first
/// one is used. A malformed timestamp fails the whole injection.
pub fn inject(doc: &mut SubtitleDocument, names: &[String], configs: &[SubtitleConfig]) -> Result<(), InjectionError> {
    for name in names.iter().filter(|n| !is_no_insertion(n)) {
        let Some(config) = configs.iter().find(|c| c.name == *name) else {
            debug!("No subtitle config named '{}', skipping", name);
            continue;
        };

        let invalid = |value: &str| InjectionError::InvalidTimestamp {
            config: config.name.clone(),
            value: value.to_string(),
        };
        let start_ms = parse_config_time(&config.start_time).ok_or_else(|| invalid(&config.start_time))?;
        let end_ms = parse_config_time(&config.end_time).ok_or_else(|| invalid(&config.end_time))?;

        doc.events.push(Event::new(start_ms, end_ms, config.ass_statement.clone()));
        debug!("Injected '{}' at {}-{} ms", config.name, start_ms, end_ms);
    }

    Ok(())
}
