use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use crate::text_utils::parse_date_time;

/// Publication timestamp as written in the post data file. Accepts a TOML
/// datetime (local or with offset), a TOML date, or a `YYYY-MM-DD HH:MM:SS`
/// string. Offsets are normalized to UTC.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TomlDateTime(pub NaiveDateTime);

impl<'de> Deserialize<'de> for TomlDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = toml::Value::deserialize(deserializer)?;
        let text = match value {
            toml::Value::Datetime(dt) => dt.to_string(),
            toml::Value::String(s) => s,
            other => return Err(Error::custom(format!("expected a date, found {}", other.type_str()))),
        };
        TomlDateTime::parse(&text).map_err(Error::custom)
    }
}

impl TomlDateTime {
    pub fn parse(text: &str) -> Result<Self, String> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(with_offset.naive_utc()));
        }
        parse_date_time(text).map(Self)
    }
}
