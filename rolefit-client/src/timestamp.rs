//! Lenient timestamp decoding.
//!
//! The backend serializes datetimes either with an offset
//! (`2025-03-01T10:00:00Z`, `...+08:00`) or naive (`2025-03-01T10:00:00.123456`).
//! Naive values are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// For `Option` fields; pair with `#[serde(default)]`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_offset_forms() {
        let z = parse("2025-03-01T10:00:00Z").unwrap();
        let east = parse("2025-03-01T18:00:00+08:00").unwrap();
        assert_eq!(z, east);
    }

    #[test]
    fn test_naive_is_utc() {
        let dt = parse("2025-03-01T10:15:30.123456").unwrap();
        assert_eq!((dt.year(), dt.hour(), dt.minute(), dt.second()), (2025, 10, 15, 30));
        assert!(parse("2025-03-01 10:15:30").is_some());
    }

    #[test]
    fn test_garbage() {
        assert!(parse("yesterday").is_none());
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "deserialize_option")]
        seen: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_optional_field() {
        let row: Row = serde_json::from_str(r#"{"seen":null}"#).unwrap();
        assert!(row.seen.is_none());
        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert!(row.seen.is_none());
        let row: Row = serde_json::from_str(r#"{"seen":"2025-01-02T03:04:05"}"#).unwrap();
        assert!(row.seen.is_some());
    }
}
