//! Serde adapters for the loosely typed values found in the schedule file and
//! in the platform's availability feed.

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer, de};

/// `HH:MM` clock times (seconds accepted on input).
pub mod hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_clock(&raw).ok_or_else(|| de::Error::custom(format!("invalid clock time '{raw}'")))
    }
}

pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
        .ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
}

impl From<Scalar> for String {
    fn from(v: Scalar) -> Self {
        match v {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
        }
    }
}

/// Resource and type ids arrive as either `565` or `"565"`.
pub fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Scalar::deserialize(d).map(String::from)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

/// Optional id filter: absent, `null`, a single id or a list of ids.
pub fn id_filter<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    let raw: Option<OneOrMany> = Option::deserialize(d)?;
    Ok(raw.map(|v| match v {
        OneOrMany::Many(items) => items.into_iter().map(String::from).collect(),
        OneOrMany::One(item) => vec![String::from(item)],
    }))
}

/// Platform timestamps are local wall-clock times. Offsets, when present, are
/// dropped in favour of the wall-clock reading they qualify.
pub fn platform_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_platform_datetime(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid platform timestamp '{raw}'")))
}

pub fn parse_platform_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accepts_minutes_and_seconds() {
        assert_eq!(parse_clock("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_clock("18:55:30"), NaiveTime::from_hms_opt(18, 55, 30));
        assert_eq!(parse_clock("9h"), None);
    }

    #[test]
    fn platform_datetime_formats() {
        let expected = chrono::NaiveDate::from_ymd_opt(2025, 8, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(parse_platform_datetime("2025-08-07T12:00:00"), Some(expected));
        assert_eq!(parse_platform_datetime("2025-08-07 12:00"), Some(expected));
        assert_eq!(parse_platform_datetime("2025-08-07T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_platform_datetime("yesterday"), None);
    }
}
