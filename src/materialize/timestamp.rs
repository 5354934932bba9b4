//! Timestamp fields
//!
//! The API sends `YYYY-MM-DDTHH:MM:SSZ`, sometimes with fractional seconds.
//! Anything from the first `.` on is dropped and `Z` re-appended before
//! parsing.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;

/// Wire format of every timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Whether a field name follows the timestamp naming convention
pub fn is_timestamp_field(name: &str) -> bool {
    name.ends_with("_at") || name.starts_with("start") || name.starts_with("end_") || name == "not_after"
}

/// Parse a wire timestamp, truncating fractional seconds
pub fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime> {
    let normalized = match raw.find('.') {
        Some(idx) => format!("{}Z", &raw[..idx]),
        None => raw.to_string(),
    };
    NaiveDateTime::parse_from_str(&normalized, TIMESTAMP_FORMAT)
        .map_err(|_| Error::timestamp(field, raw))
}

/// Render a timestamp in wire format
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter for optional wire timestamps
pub mod wire_option {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse_timestamp("timestamp", &s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
