//! Observation time handling.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Time coverage of one ABI scan (`time_coverage_start` .. `time_coverage_end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ObservationWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parse the ISO 8601 strings stored in ABI global attributes,
    /// e.g. `2023-06-01T18:01:17.2Z`.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeParseError> {
        Ok(Self::new(parse_iso8601(start)?, parse_iso8601(end)?))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Scan midpoint.
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + self.duration() / 2
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }
}

/// Parse an ISO 8601 timestamp, assuming UTC when no offset is given.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.trim_end_matches('Z');
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_abi_coverage() {
        let window =
            ObservationWindow::parse("2023-06-01T18:01:17.2Z", "2023-06-01T18:03:54.5Z").unwrap();
        assert_eq!(window.start.hour(), 18);
        assert_eq!(window.start.second(), 17);
        assert!(window.duration() > Duration::minutes(2));
        assert!(window.contains(&window.midpoint()));
    }

    #[test]
    fn test_parse_without_zone() {
        let dt = parse_iso8601("2024-01-15T12:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_iso8601("yesterday"),
            Err(TimeParseError::InvalidFormat(_))
        ));
    }
}
