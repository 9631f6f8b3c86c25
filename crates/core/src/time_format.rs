//! Serde helpers for the `HH:MM` wall-clock times used by booking forms.
//!
//! Times are serialized as `HH:MM`. Deserialization accepts `HH:MM` or
//! `HH:MM:SS`, and treats a missing value, `null` or an empty string as
//! "not set".

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const SHORT_FORMAT: &str = "%H:%M";
const LONG_FORMAT: &str = "%H:%M:%S";

/// Parses a wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, SHORT_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, LONG_FORMAT))
        .ok()
}

/// Formats a time as `HH:MM`.
pub fn format_time(time: &NaiveTime) -> String {
    time.format(SHORT_FORMAT).to_string()
}

/// `#[serde(with = "...")]` module for `Option<NaiveTime>` fields.
pub mod option_hhmm {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&format_time(time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_time(value).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", value))
            }),
        }
    }
}
