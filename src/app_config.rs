use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::injector::parse_config_time;
use crate::subtitle::AssColor;
use crate::variant::TransportConfig;

/// Application configuration module
/// This module handles the persisted settings (`conf.json`) including loading,
/// validating and saving them.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Output directory; empty means next to each source file
    #[serde(default)]
    pub output_directory: String,

    /// Font family of the Default style
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font size of the Default style
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Primary colour, e.g. `H00FFFFFF`
    #[serde(default = "default_subtitle_color")]
    pub subtitle_color: String,

    /// Outline colour
    #[serde(default = "default_outline_color")]
    pub outline_color: String,

    /// Named caption blocks that can be injected
    #[serde(default)]
    pub subtitle_configs: Vec<SubtitleConfig>,

    /// Remove each source after its output is written
    #[serde(default)]
    pub delete_original: bool,

    /// Convert traditional script to simplified
    #[serde(default)]
    pub convert_variant: bool,

    /// Try the online service before the local table
    #[serde(default = "default_true")]
    pub remote_priority: bool,

    /// Conversion service settings
    #[serde(default)]
    pub variant: VariantConfig,

    /// Worker pool size; host parallelism when unset
    #[serde(default)]
    pub max_concurrent_jobs: Option<usize>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// A named caption block with its display window
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubtitleConfig {
    /// Unique name used to select the block
    pub name: String,

    /// `HH:MM:SS.mmm`
    pub start_time: String,

    /// `HH:MM:SS.mmm`
    pub end_time: String,

    /// Literal ASS text or override tags to inject
    pub ass_statement: String,
}

impl SubtitleConfig {
    pub fn new(name: &str, start_time: &str, end_time: &str, ass_statement: &str) -> Self {
        Self {
            name: name.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            ass_statement: ass_statement.to_string(),
        }
    }
}

/// Script variant conversion configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VariantConfig {
    /// Conversion service URL
    #[serde(default = "default_variant_endpoint")]
    pub endpoint: String,

    /// Timeout of one transport attempt in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Proxies tried in order after the direct connection
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,

    /// Whether the offline table may be used
    #[serde(default = "default_true")]
    pub local_enabled: bool,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            endpoint: default_variant_endpoint(),
            timeout_secs: default_timeout_secs(),
            proxies: default_proxies(),
            local_enabled: true,
        }
    }
}

impl VariantConfig {
    /// Direct connection first, then each proxy in configured order
    pub fn transport_configs(&self) -> Vec<TransportConfig> {
        std::iter::once(TransportConfig::Direct)
            .chain(self.proxies.iter().map(|p| TransportConfig::Proxy(p.clone())))
            .collect()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_font_family() -> String {
    "方正粗圆_GBK".to_string()
}

fn default_font_size() -> f32 {
    70.0
}

fn default_subtitle_color() -> String {
    "H00FFFFFF".to_string()
}

fn default_outline_color() -> String {
    "H00000000".to_string()
}

fn default_variant_endpoint() -> String {
    "https://api.zhconvert.org/convert".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_proxies() -> Vec<String> {
    vec!["http://127.0.0.1:7890".to_string(), "http://127.0.0.1:1080".to_string()]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration at `path`, writing the defaults there first when missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        std::fs::write(path, json).with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if AssColor::parse(&self.subtitle_color).is_none() {
            return Err(anyhow!("Invalid subtitle colour: {}", self.subtitle_color));
        }
        if AssColor::parse(&self.outline_color).is_none() {
            return Err(anyhow!("Invalid outline colour: {}", self.outline_color));
        }
        if self.font_size.is_nan() || self.font_size <= 0.0 {
            return Err(anyhow!("Font size must be positive, got {}", self.font_size));
        }

        url::Url::parse(&self.variant.endpoint)
            .with_context(|| format!("Invalid conversion endpoint: {}", self.variant.endpoint))?;
        for proxy in &self.variant.proxies {
            url::Url::parse(proxy).with_context(|| format!("Invalid proxy URL: {}", proxy))?;
        }
        if self.variant.timeout_secs == 0 {
            return Err(anyhow!("Conversion timeout must be at least one second"));
        }

        if self.max_concurrent_jobs == Some(0) {
            return Err(anyhow!("max_concurrent_jobs must be greater than zero"));
        }

        let mut names = HashSet::new();
        for config in &self.subtitle_configs {
            if !names.insert(config.name.as_str()) {
                return Err(anyhow!("Duplicate subtitle config name: {}", config.name));
            }
            for value in [&config.start_time, &config.end_time] {
                parse_config_time(value)
                    .ok_or_else(|| anyhow!("Invalid timestamp '{}' in subtitle config '{}'", value, config.name))?;
            }
        }

        Ok(())
    }

    /// Output directory with a leading `~` expanded, or None when unset
    pub fn output_dir(&self) -> Option<PathBuf> {
        let dir = self.output_directory.trim();
        if dir.is_empty() {
            return None;
        }
        let rest = if dir == "~" { Some("") } else { dir.strip_prefix("~/") };
        match (rest, dirs::home_dir()) {
            (Some(rest), Some(home)) => Some(home.join(rest)),
            _ => Some(PathBuf::from(dir)),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_directory: String::new(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            subtitle_color: default_subtitle_color(),
            outline_color: default_outline_color(),
            subtitle_configs: Vec::new(),
            delete_original: false,
            convert_variant: false,
            remote_priority: true,
            variant: VariantConfig::default(),
            max_concurrent_jobs: None,
            log_level: LogLevel::default(),
        }
    }
}
