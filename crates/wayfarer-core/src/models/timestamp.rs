//! ISO-8601 (RFC 3339) timestamp serialization
//!
//! Cached values are read back by other processes, so timestamps always use
//! UTC with a `Z` suffix and millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_serializes_as_utc_iso8601() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-17T09:30:00.000Z"}"#);
    }

    #[test]
    fn test_accepts_offsets() {
        let parsed: Stamped = serde_json::from_str(r#"{"at":"2024-05-17T19:30:00+10:00"}"#).unwrap();
        assert_eq!(parsed.at, Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }
}
