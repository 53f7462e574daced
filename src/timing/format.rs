use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

// @module: Display formats for millisecond times

/// How times are rendered in listings
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `m:ss`, rounded to the nearest second
    #[default]
    MinSec,
    /// `HH:MM:SS,mmm`
    Timestamp,
    /// Raw millisecond count
    Milliseconds,
}

impl TimeFormat {
    // @returns: Formatted time
    pub fn format(&self, ms: u64) -> String {
        match self {
            Self::MinSec => format_min_sec(ms),
            Self::Timestamp => format_timestamp(ms),
            Self::Milliseconds => ms.to_string(),
        }
    }
}

impl std::str::FromStr for TimeFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "min_sec" | "minsec" => Ok(Self::MinSec),
            "timestamp" => Ok(Self::Timestamp),
            "ms" | "milliseconds" => Ok(Self::Milliseconds),
            _ => Err(anyhow!("Invalid time format: {}", s)),
        }
    }
}

/// Format milliseconds as `m:ss`.
///
/// Seconds are rounded to the nearest whole second; a value that rounds up
/// to 60 carries into the minutes (`59_500` ms is `1:00`).
pub fn format_min_sec(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000 + 500) / 1_000;

    if seconds == 60 {
        format!("{}:00", minutes + 1)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format milliseconds as `HH:MM:SS,mmm`
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse `HH:MM:SS,mmm` (or `.` before the millis) into milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}
