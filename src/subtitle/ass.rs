//! ASS (Advanced SubStation Alpha) reader and writer.
//!
//! ASS files have three sections this module cares about:
//! - `[Script Info]`: metadata (title, resolution, etc.)
//! - `[V4+ Styles]` (or `[V4 Styles]`): style definitions
//! - `[Events]`: dialogue and comment lines
//!
//! Event times are written as `H:MM:SS.cc` (centiseconds). Millisecond
//! fractions on input are kept in memory and rounded on write.

use std::fmt::Write;

use super::ParseFailure;
use super::model::{AssColor, Event, StyleRecord, SubtitleDocument, SubtitleFormat};

const STYLE_FORMAT_LINE: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT_LINE: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Parse ASS content into a document.
pub fn parse_ass(content: &str) -> Result<SubtitleDocument, ParseFailure> {
    let mut doc = SubtitleDocument::new(SubtitleFormat::Ass);
    let mut current_section = String::new();
    let mut style_format: Vec<String> = Vec::new();
    let mut event_format: Vec<String> = Vec::new();

    for (line_index, raw_line) in content.lines().enumerate() {
        let line_num = line_index + 1;
        let line = raw_line.trim_start_matches('\u{feff}').trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].to_ascii_lowercase();
            continue;
        }

        if line.starts_with(';') || line.starts_with("!:") {
            continue;
        }

        match current_section.as_str() {
            "script info" => {
                if let Some((key, value)) = line.split_once(':') {
                    doc.metadata.set(key.trim(), value.trim());
                }
            }
            "v4+ styles" | "v4 styles" => {
                if line.starts_with("Format:") {
                    style_format = parse_format_line(line);
                } else if let Some(body) = line.strip_prefix("Style:") {
                    doc.upsert_style(parse_style_line(body, &style_format, line_num)?);
                }
            }
            "events" => {
                if line.starts_with("Format:") {
                    event_format = parse_format_line(line);
                } else if let Some(body) = line.strip_prefix("Dialogue:") {
                    doc.events.push(parse_event_line(body, &event_format, false, line_num)?);
                } else if let Some(body) = line.strip_prefix("Comment:") {
                    doc.events.push(parse_event_line(body, &event_format, true, line_num)?);
                }
            }
            // Fonts, Graphics and unknown sections are not carried over
            _ => {}
        }
    }

    Ok(doc)
}

/// Parse a `Format:` line into lowercase field names
fn parse_format_line(line: &str) -> Vec<String> {
    line.trim_start_matches("Format:")
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .collect()
}

fn parse_style_line(body: &str, format: &[String], line_num: usize) -> Result<StyleRecord, ParseFailure> {
    let default_format;
    let format = if format.is_empty() {
        default_format = default_style_format();
        default_format.as_slice()
    } else {
        format
    };

    let fields: Vec<&str> = body.trim().split(',').collect();
    if fields.len() < format.len() {
        return Err(ParseFailure::new(
            line_num,
            format!("style expects {} fields, got {}", format.len(), fields.len()),
        ));
    }

    let mut style = StyleRecord::default();
    for (field_name, value) in format.iter().zip(fields.iter().map(|f| f.trim())) {
        let flag = value == "-1" || value == "1";
        match field_name.as_str() {
            "name" => style.name = value.to_string(),
            "fontname" => style.font_family = value.to_string(),
            "fontsize" => style.font_size = value.parse().unwrap_or(style.font_size),
            "primarycolour" => style.primary_color = AssColor::parse(value).unwrap_or(style.primary_color),
            "secondarycolour" => style.secondary_color = AssColor::parse(value).unwrap_or(style.secondary_color),
            "outlinecolour" | "tertiarycolour" => {
                style.outline_color = AssColor::parse(value).unwrap_or(style.outline_color)
            }
            "backcolour" => style.back_color = AssColor::parse(value).unwrap_or(style.back_color),
            "bold" => style.bold = flag,
            "italic" => style.italic = flag,
            "underline" => style.underline = flag,
            "strikeout" => style.strikeout = flag,
            "scalex" => style.scale_x = value.parse().unwrap_or(style.scale_x),
            "scaley" => style.scale_y = value.parse().unwrap_or(style.scale_y),
            "spacing" => style.spacing = value.parse().unwrap_or(style.spacing),
            "angle" => style.angle = value.parse().unwrap_or(style.angle),
            "borderstyle" => style.border_style = value.parse().unwrap_or(style.border_style),
            "outline" => style.outline = value.parse().unwrap_or(style.outline),
            "shadow" => style.shadow = value.parse().unwrap_or(style.shadow),
            "alignment" => style.alignment = value.parse().unwrap_or(style.alignment),
            "marginl" => style.margin_l = value.parse().unwrap_or(style.margin_l),
            "marginr" => style.margin_r = value.parse().unwrap_or(style.margin_r),
            "marginv" => style.margin_v = value.parse().unwrap_or(style.margin_v),
            "encoding" => style.encoding = value.parse().unwrap_or(style.encoding),
            _ => {}
        }
    }

    Ok(style)
}

fn parse_event_line(body: &str, format: &[String], is_comment: bool, line_num: usize) -> Result<Event, ParseFailure> {
    let default_format;
    let format = if format.is_empty() {
        default_format = default_event_format();
        default_format.as_slice()
    } else {
        format
    };

    // Text is the last field and may itself contain commas
    let text_index = format.iter().position(|f| f == "text").unwrap_or(format.len() - 1);
    let parts: Vec<&str> = body.trim_start().splitn(text_index + 1, ',').collect();
    if parts.len() < text_index + 1 {
        return Err(ParseFailure::new(
            line_num,
            format!("event expects {} fields, got {}", text_index + 1, parts.len()),
        ));
    }

    let mut event = Event {
        is_comment,
        ..Default::default()
    };

    for (i, field_name) in format.iter().enumerate() {
        let raw = parts.get(i).copied().unwrap_or("");
        let value = raw.trim();
        match field_name.as_str() {
            "layer" | "marked" => event.layer = value.trim_start_matches("Marked=").parse().unwrap_or(0),
            "start" => {
                event.start_ms = parse_ass_time(value)
                    .ok_or_else(|| ParseFailure::new(line_num, format!("invalid start time '{}'", value)))?
            }
            "end" => {
                event.end_ms = parse_ass_time(value)
                    .ok_or_else(|| ParseFailure::new(line_num, format!("invalid end time '{}'", value)))?
            }
            "style" => event.style = value.to_string(),
            "name" | "actor" => event.actor = value.to_string(),
            "marginl" => event.margin_l = value.parse().unwrap_or(0),
            "marginr" => event.margin_r = value.parse().unwrap_or(0),
            "marginv" => event.margin_v = value.parse().unwrap_or(0),
            "effect" => event.effect = value.to_string(),
            // Leading spaces in the text are significant
            "text" => event.text = raw.trim_end_matches(['\r', '\n']).to_string(),
            _ => {}
        }
    }

    Ok(event)
}

/// Parse `H:MM:SS.cc` (fractions of any precision) into milliseconds
pub fn parse_ass_time(value: &str) -> Option<u64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return None;
    };

    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let (seconds, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let seconds: u64 = seconds.parse().ok()?;

    let millis = if fraction.is_empty() {
        0
    } else {
        // Normalise to three digits: "5" -> 500, "50" -> 500, "5001" -> 500
        let mut digits: String = fraction.chars().take(3).collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        while digits.len() < 3 {
            digits.push('0');
        }
        digits.parse().ok()?
    };

    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?
        .checked_mul(1000)?
        .checked_add(millis)
}

/// Format milliseconds as `H:MM:SS.cc`, rounding to the nearest centisecond
pub fn format_ass_time(ms: u64) -> String {
    let cs = ms.saturating_add(5) / 10;
    let hours = cs / 360_000;
    let minutes = (cs % 360_000) / 6_000;
    let seconds = (cs % 6_000) / 100;
    let centis = cs % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Serialize a document to ASS text
pub fn write_ass(doc: &SubtitleDocument) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("; Script generated by subass\n");
    if !doc.metadata.contains_key("ScriptType") {
        out.push_str("ScriptType: v4.00+\n");
    }
    for (key, value) in doc.metadata.iter() {
        let _ = writeln!(out, "{}: {}", key, value);
    }

    out.push_str("\n[V4+ Styles]\n");
    out.push_str(STYLE_FORMAT_LINE);
    out.push('\n');
    for style in &doc.styles {
        out.push_str(&style_line(style));
        out.push('\n');
    }

    out.push_str("\n[Events]\n");
    out.push_str(EVENT_FORMAT_LINE);
    out.push('\n');
    for event in &doc.events {
        out.push_str(&event_line(event));
        out.push('\n');
    }

    out
}

fn style_line(style: &StyleRecord) -> String {
    let flag = |b: bool| if b { -1 } else { 0 };
    format!(
        "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        style.name,
        style.font_family,
        format_number(style.font_size),
        style.primary_color,
        style.secondary_color,
        style.outline_color,
        style.back_color,
        flag(style.bold),
        flag(style.italic),
        flag(style.underline),
        flag(style.strikeout),
        format_number(style.scale_x),
        format_number(style.scale_y),
        format_number(style.spacing),
        format_number(style.angle),
        style.border_style,
        format_number(style.outline),
        format_number(style.shadow),
        style.alignment,
        style.margin_l,
        style.margin_r,
        style.margin_v,
        style.encoding,
    )
}

fn event_line(event: &Event) -> String {
    // Real line breaks would split the record; ASS spells them \N
    let text = event.text.replace("\r\n", "\\N").replace('\n', "\\N");
    format!(
        "{}: {},{},{},{},{},{},{},{},{},{}",
        if event.is_comment { "Comment" } else { "Dialogue" },
        event.layer,
        format_ass_time(event.start_ms),
        format_ass_time(event.end_ms),
        event.style,
        event.actor,
        event.margin_l,
        event.margin_r,
        event.margin_v,
        event.effect,
        text,
    )
}

/// `70.0` -> `70`, `20.5` -> `20.5`
fn format_number(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn default_style_format() -> Vec<String> {
    STYLE_FORMAT_LINE
        .trim_start_matches("Format:")
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .collect()
}

fn default_event_format() -> Vec<String> {
    EVENT_FORMAT_LINE
        .trim_start_matches("Format:")
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .collect()
}
