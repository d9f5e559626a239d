//! Source of the current UTC instant.
//!
//! Handlers never call `Utc::now()` directly; they read time through a
//! [`Clock`] so tests can pin it.

use chrono::{DateTime, SecondsFormat, Utc};

/// Supplies the current UTC instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format an instant as ISO-8601 UTC with microsecond precision and a `Z` suffix.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 21, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(instant), "2024-01-21T12:00:00.000000Z");
    }

    #[test]
    fn test_formatted_timestamp_round_trips() {
        let now = SystemClock.now();
        let parsed = DateTime::parse_from_rfc3339(&format_timestamp(now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }
}
