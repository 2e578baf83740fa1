//! Note timestamps.
//!
//! ENEX dates are normally compact UTC stamps (`20110610T182917Z`), but
//! hand-edited or third-party exports carry ISO-8601 variants too, so the
//! parser accepts a range of layouts.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{DATE_FORMAT, EPOCH_SENTINEL_SECS};

const OFFSET_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// A second-precision instant rendered with [`DATE_FORMAT`].
///
/// Two timestamps are equal when they render the same text, which is all a
/// written record keeps; the source offset is not part of the output.
#[derive(Debug, Clone, Copy)]
pub struct NoteTimestamp(DateTime<FixedOffset>);

impl PartialEq for NoteTimestamp {
    fn eq(&self, other: &Self) -> bool {
        self.0.naive_local() == other.0.naive_local()
    }
}

impl Eq for NoteTimestamp {}

impl NoteTimestamp {
    /// `1970-01-01T00:00:17Z`, used when a note has no creation date
    pub fn epoch_sentinel() -> Self {
        let instant = DateTime::<Utc>::from_timestamp(EPOCH_SENTINEL_SECS, 0).unwrap_or_default();
        Self(instant.fixed_offset())
    }

    pub fn parse(value: &str) -> Option<Self> {
        parse_note_date(value).map(Self)
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn to_system_time(&self) -> SystemTime {
        SystemTime::from(self.0)
    }
}

impl From<DateTime<FixedOffset>> for NoteTimestamp {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self(instant.trunc_subsecs(0))
    }
}

impl fmt::Display for NoteTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for NoteTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT)
            .map(|naive| Self(naive.and_utc().fixed_offset()))
            .map_err(serde::de::Error::custom)
    }
}

/// Parse a note date to whole seconds, keeping the source offset. Values
/// without an offset are taken as UTC.
pub fn parse_note_date(value: &str) -> Option<DateTime<FixedOffset>> {
    parse_instant(value).map(|dt| dt.trunc_subsecs(0))
}

fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    // A trailing Z is UTC; chrono's %z does not accept it
    if let Some(utc) = value.strip_suffix(|c: char| c.eq_ignore_ascii_case(&'z')) {
        return parse_naive(utc).map(|naive| naive.and_utc().fixed_offset());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    parse_naive(value).map(|naive| naive.and_utc().fixed_offset())
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_ONLY_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
