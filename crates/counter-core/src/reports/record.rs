//! Report record types and their on-disk JSON shape.
//!
//! Records are appended as one JSON object per line. Field names are part of
//! the persisted format and use the camelCase the downstream tooling expects,
//! so renames here are breaking changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rates::JokeRate;

/// Which rollup window a record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    #[serde(rename = "3-hour")]
    ThreeHour,
    #[serde(rename = "6-hour")]
    SixHour,
    #[serde(rename = "12-hour")]
    TwelveHour,
    #[serde(rename = "daily")]
    Daily,
}

impl ReportKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeHour => "3-hour",
            Self::SixHour => "6-hour",
            Self::TwelveHour => "12-hour",
            Self::Daily => "daily",
        }
    }
}

/// One persisted report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    /// When the record was generated, not when its window started.
    pub date: DateTime<Utc>,
    #[serde(rename = "jokeCount")]
    pub joke_count: u64,
    #[serde(rename = "rateHour")]
    pub rate_hour: f64,
    #[serde(rename = "rateDay")]
    pub rate_day: f64,
    /// Per-witness tallies. Only the 3-hour record carries them.
    #[serde(rename = "ipCounts", skip_serializing_if = "Option::is_none")]
    pub ip_counts: Option<HashMap<String, u64>>,
}

impl ReportRecord {
    #[must_use]
    pub fn new(kind: ReportKind, date: DateTime<Utc>, joke_count: u64, rate: JokeRate) -> Self {
        Self {
            kind,
            date,
            joke_count,
            rate_hour: rate.per_hour,
            rate_day: rate.per_day,
            ip_counts: None,
        }
    }

    #[must_use]
    pub fn with_ip_counts(mut self, ip_counts: HashMap<String, u64>) -> Self {
        self.ip_counts = Some(ip_counts);
        self
    }
}
