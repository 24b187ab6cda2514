//! Wire timestamp used by fetch and list responses.
//!
//! Existing sidecars and SDKs parse timestamps in the Ruby date layout
//! (`Mon Jan 02 15:04:05 -0700 2006`), so that exact textual form is what goes
//! over the wire in both directions.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// `strftime` layout of the Ruby date format, day of month zero padded.
pub const RUBY_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A point in time that serializes as a Ruby date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonTime(DateTime<FixedOffset>);

impl JsonTime {
    /// Wrap a timestamp, keeping its UTC offset.
    pub fn new(time: DateTime<FixedOffset>) -> Self {
        Self(time)
    }

    /// The current time in UTC.
    pub fn now() -> Self {
        Self(Utc::now().fixed_offset())
    }

    /// Parse a Ruby date string.
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_str(value, RUBY_DATE_FORMAT).map(Self)
    }

    /// True for the zero value (the Unix epoch), which responses carry when
    /// they report an error.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }
}

impl Default for JsonTime {
    fn default() -> Self {
        Self(DateTime::<Utc>::default().fixed_offset())
    }
}

impl From<DateTime<Utc>> for JsonTime {
    fn from(time: DateTime<Utc>) -> Self {
        Self(time.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for JsonTime {
    fn from(time: DateTime<FixedOffset>) -> Self {
        Self(time)
    }
}

impl fmt::Display for JsonTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(RUBY_DATE_FORMAT))
    }
}

impl FromStr for JsonTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JsonTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        JsonTime::parse(&value).map_err(de::Error::custom)
    }
}
