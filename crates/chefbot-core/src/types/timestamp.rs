use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Local wall-clock time rendered with a chrono format string,
    /// e.g. `%Y%m%d-%H%M%S` for run names.
    pub fn format_local(&self, fmt: &str) -> String {
        self.0.with_timezone(&Local).format(fmt).to_string()
    }

    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        let delta = self.unix_millis() - earlier.unix_millis();
        Duration::from_millis(delta.max(0) as u64)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_since_never_negative() {
        let later = Timestamp::from_unix_millis(2_000).unwrap();
        let earlier = Timestamp::from_unix_millis(1_500).unwrap();
        assert_eq!(later.duration_since(&earlier), Duration::from_millis(500));
        assert_eq!(earlier.duration_since(&later), Duration::ZERO);
    }

    #[test]
    fn test_format_local_shape() {
        let name = Timestamp::now().format_local("%Y%m%d-%H%M%S");
        assert_eq!(name.len(), 15);
        assert_eq!(&name[8..9], "-");
    }
}
