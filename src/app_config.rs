use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::timing::TimeFormat;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Listing display settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Time resolution settings
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How transcripts are listed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Format used for annotation start times
    #[serde(default)]
    pub time_format: TimeFormat,

    /// Shown instead of a time that cannot be resolved
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Print a header line before each tier
    #[serde(default = "default_true")]
    pub show_tier_headers: bool,

    /// Indent child tiers under their parent
    #[serde(default = "default_true")]
    pub indent_child_tiers: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            placeholder: default_placeholder(),
            show_tier_headers: true,
            indent_child_tiers: true,
        }
    }
}

/// How annotation times are resolved
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolutionConfig {
    /// Memoize resolved intervals for the loaded document
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Parent hops allowed before a reference chain counts as cyclic.
    /// `None` uses the annotation count of the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_limit: Option<usize>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            hop_limit: None,
        }
    }
}

/// How exported copies are named
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExportConfig {
    /// Inserted before the extension so exports never overwrite the source
    #[serde(default = "default_copy_suffix")]
    pub copy_suffix: String,

    /// Pretty-print exported JSON
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            copy_suffix: default_copy_suffix(),
            pretty: true,
        }
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
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_placeholder() -> String {
    "--:--".to_string()
}

fn default_copy_suffix() -> String {
    " (copy)".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.export.copy_suffix.trim().is_empty() {
            return Err(anyhow!("Export copy suffix must not be empty; exports would overwrite the source"));
        }

        if self.resolution.hop_limit == Some(0) {
            return Err(anyhow!("Resolution hop limit must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplayConfig::default(),
            resolution: ResolutionConfig::default(),
            export: ExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
