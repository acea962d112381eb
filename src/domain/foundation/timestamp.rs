//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Creates a timestamp from Unix seconds.
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(Utc.timestamp_opt(secs as i64, 0).unwrap())
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> u64 {
        self.0.timestamp() as u64
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }

    /// Creates a new timestamp by subtracting the specified number of seconds.
    pub fn minus_secs(&self, secs: u64) -> Self {
        Self(self.0 - Duration::seconds(secs as i64))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
