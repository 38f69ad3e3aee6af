/*!
 * In-memory subtitle document model.
 *
 * A `SubtitleDocument` holds the Script Info metadata, the named styles and
 * the ordered list of timed events of one subtitle file. It is created fresh
 * by each conversion job and never shared between jobs.
 */

use std::fmt;

/// Name of the style every converted document must carry
pub const DEFAULT_STYLE: &str = "Default";

/// Source format a document was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
}

impl SubtitleFormat {
    /// Detect the format from a file extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "srt" => Some(Self::Srt),
            "vtt" => Some(Self::Vtt),
            "ass" => Some(Self::Ass),
            _ => None,
        }
    }

    /// Lowercase extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// ASS colour, stored as RGBA and written as `&HAABBGGRR`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// ASS alpha: 0 is opaque, 255 fully transparent
    pub a: u8,
}

impl AssColor {
    pub const WHITE: AssColor = AssColor { r: 255, g: 255, b: 255, a: 0 };
    pub const BLACK: AssColor = AssColor { r: 0, g: 0, b: 0, a: 0 };
    pub const RED: AssColor = AssColor { r: 255, g: 0, b: 0, a: 0 };

    /// Opaque colour from RGB components
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    /// Parse a colour string.
    ///
    /// Accepts `&HAABBGGRR`, `&HBBGGRR`, the ampersand-less `HAABBGGRR` form
    /// kept in settings files, and HTML-style `#RRGGBB`. A trailing `&` is
    /// tolerated.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let rgb = u32::from_str_radix(hex, 16).ok()?;
            return Some(Self::from_rgb(
                ((rgb >> 16) & 0xFF) as u8,
                ((rgb >> 8) & 0xFF) as u8,
                (rgb & 0xFF) as u8,
            ));
        }

        let hex = value
            .trim_start_matches('&')
            .strip_prefix(['H', 'h'])?
            .trim_end_matches('&');
        if hex.is_empty() || hex.len() > 8 {
            return None;
        }
        let abgr = u32::from_str_radix(hex, 16).ok()?;
        Some(Self {
            a: ((abgr >> 24) & 0xFF) as u8,
            b: ((abgr >> 16) & 0xFF) as u8,
            g: ((abgr >> 8) & 0xFF) as u8,
            r: (abgr & 0xFF) as u8,
        })
    }

    /// ASS wire form, `&HAABBGGRR`
    pub fn to_ass_string(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }
}

impl Default for AssColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for AssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ass_string())
    }
}

/// One V4+ style record
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    pub name: String,
    pub font_family: String,
    pub font_size: f32,
    pub primary_color: AssColor,
    pub secondary_color: AssColor,
    pub outline_color: AssColor,
    pub back_color: AssColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub scale_x: f32,
    pub scale_y: f32,
    pub spacing: f32,
    pub angle: f32,
    /// 1 = outline + drop shadow, 3 = opaque box
    pub border_style: i32,
    /// Outline width in pixels
    pub outline: f32,
    pub shadow: f32,
    /// Numpad alignment, 2 is bottom centre
    pub alignment: i32,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub encoding: i32,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            name: DEFAULT_STYLE.to_string(),
            font_family: "Arial".to_string(),
            font_size: 20.0,
            primary_color: AssColor::WHITE,
            secondary_color: AssColor::RED,
            outline_color: AssColor::BLACK,
            back_color: AssColor::BLACK,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

impl StyleRecord {
    /// Create a style with the given name and default attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One timed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub start_ms: u64,
    pub end_ms: u64,
    /// ASS-native text (`\N` hard breaks, override blocks in braces)
    pub text: String,
    pub style: String,
    pub layer: i32,
    pub actor: String,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub effect: String,
    /// Written as `Comment:` instead of `Dialogue:`
    pub is_comment: bool,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            start_ms: 0,
            end_ms: 0,
            text: String::new(),
            style: DEFAULT_STYLE.to_string(),
            layer: 0,
            actor: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            is_comment: false,
        }
    }
}

impl Event {
    /// Dialogue event on the default style
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Whether the text has anything besides whitespace
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Ordered Script Info key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, keeping the original position of an existing key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set a value only when the key is missing or its value is empty
    pub fn set_if_empty(&mut self, key: &str, value: &str) {
        if self.get(key).is_none_or(|v| v.trim().is_empty()) {
            self.set(key, value);
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A complete subtitle document
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    /// Format the document was loaded from
    pub format: SubtitleFormat,
    pub metadata: Metadata,
    pub styles: Vec<StyleRecord>,
    pub events: Vec<Event>,
}

impl SubtitleDocument {
    /// Create an empty document of the given source format
    pub fn new(format: SubtitleFormat) -> Self {
        Self {
            format,
            metadata: Metadata::new(),
            styles: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn style(&self, name: &str) -> Option<&StyleRecord> {
        self.styles.iter().find(|s| s.name == name)
    }

    pub fn style_mut(&mut self, name: &str) -> Option<&mut StyleRecord> {
        self.styles.iter_mut().find(|s| s.name == name)
    }

    /// Insert a style, replacing any existing style with the same name in place
    pub fn upsert_style(&mut self, style: StyleRecord) {
        match self.styles.iter_mut().find(|s| s.name == style.name) {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
    }
}
