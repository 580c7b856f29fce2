//! Time-of-day buckets and clock formatting for spoken output

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four fixed clock-hour ranges used to vary wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    /// 05:00 – 10:59
    #[serde(rename = "morgen")]
    Dawn,
    /// 11:00 – 16:59
    #[serde(rename = "tag")]
    Day,
    /// 17:00 – 21:59
    #[serde(rename = "abend")]
    Evening,
    /// 22:00 – 04:59
    #[serde(rename = "nacht")]
    Night,
}

impl DayPart {
    /// Bucket for a clock hour (0–23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=10 => DayPart::Dawn,
            11..=16 => DayPart::Day,
            17..=21 => DayPart::Evening,
            _ => DayPart::Night,
        }
    }

    /// Bucket for any time value
    pub fn of<T: Timelike>(time: &T) -> Self {
        Self::from_hour(time.hour())
    }

    /// Label used in memo keys and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::Dawn => "morgen",
            DayPart::Day => "tag",
            DayPart::Evening => "abend",
            DayPart::Night => "nacht",
        }
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a time as zero-padded `HH:MM`
pub fn hhmm<T: Timelike>(time: &T) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
