//! Minimum file date ("watermark") codec.
//!
//! The watermark is a local wall-clock timestamp with second precision,
//! persisted as `dd/mm/yyyy HH:MM:SS`.

use std::fmt::{self, Display, Formatter};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use serde::{Serialize, Serializer};

/// `chrono` format string of the persisted watermark.
pub const WATERMARK_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Minimum last-modified time a file must have to be considered new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(NaiveDateTime);

impl Watermark {
    /// Parse the persisted `dd/mm/yyyy HH:MM:SS` representation.
    ///
    /// # Errors
    ///
    /// Returns the `chrono` parse error when `value` does not match the format.
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(value.trim(), WATERMARK_FORMAT).map(Self)
    }

    /// Watermark for a local instant, truncated to whole seconds.
    #[must_use]
    pub fn from_local(instant: DateTime<Local>) -> Self {
        Self::from_naive(instant.naive_local())
    }

    /// Watermark for a naive local timestamp, truncated to whole seconds.
    #[must_use]
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self(naive.with_nanosecond(0).unwrap_or(naive))
    }

    /// Underlying local timestamp.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Whether a file modified at `modified` is at or after the watermark.
    ///
    /// The comparison happens between instants, so files written during a
    /// repeated daylight-saving hour are not mistaken for older ones.
    #[must_use]
    pub fn admits(&self, modified: SystemTime) -> bool {
        self.admits_in(&Local, modified)
    }

    fn admits_in<Tz: TimeZone>(&self, zone: &Tz, modified: SystemTime) -> bool {
        modified >= self.instant_in(zone)
    }

    // An ambiguous local time resolves to its first occurrence. A local time
    // skipped by a clock change resolves one hour earlier.
    fn instant_in<Tz: TimeZone>(&self, zone: &Tz) -> SystemTime {
        zone.from_local_datetime(&self.0)
            .earliest()
            .or_else(|| zone.from_local_datetime(&(self.0 - TimeDelta::hours(1))).earliest())
            .map_or(SystemTime::UNIX_EPOCH, SystemTime::from)
    }

    /// Next watermark after a pass that started at `started_at`.
    ///
    /// Never moves backward.
    #[must_use]
    pub fn advance_to(self, started_at: DateTime<Local>) -> Self {
        self.max(Self::from_local(started_at))
    }
}

impl Display for Watermark {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format(WATERMARK_FORMAT))
    }
}

impl Serialize for Watermark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, LocalResult, NaiveDate};

    fn naive(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 4, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .expect("valid test timestamp")
    }

    #[test]
    fn parses_and_formats_the_persisted_layout() {
        let watermark = Watermark::parse("25/04/2017 08:00:00").expect("valid watermark");
        assert_eq!(watermark.as_naive(), naive(25, 8, 0, 0));
        assert_eq!(watermark.to_string(), "25/04/2017 08:00:00");
        assert!(Watermark::parse(" 25/04/2017 08:00:00 ").is_ok());
    }

    #[test]
    fn rejects_other_layouts() {
        assert!(Watermark::parse("2017-04-25 08:00:00").is_err());
        assert!(Watermark::parse("25/04/2017").is_err());
        assert!(Watermark::parse("null").is_err());
        assert!(Watermark::parse("32/04/2017 08:00:00").is_err());
    }

    #[test]
    fn admits_is_inclusive() {
        let boundary = Local
            .from_local_datetime(&naive(25, 8, 0, 0))
            .earliest()
            .expect("unambiguous local time");
        let watermark = Watermark::from_local(boundary);
        let at: SystemTime = boundary.into();
        let before: SystemTime = (boundary - Duration::seconds(1)).into();
        let after: SystemTime = (boundary + Duration::milliseconds(1)).into();

        assert!(watermark.admits(at));
        assert!(watermark.admits(after));
        assert!(!watermark.admits(before));
    }

    // Local clock goes back from 00:00 (UTC-2) to 23:00 (UTC-3) at
    // 2024-02-18T02:00Z, so 23:00..00:00 on the 17th happens twice.
    #[derive(Debug, Clone, Copy)]
    struct FallBackZone;

    impl FallBackZone {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 2, 18)
                .and_then(|date| date.and_hms_opt(2, 0, 0))
                .expect("valid switch instant")
        }

        fn summer() -> FixedOffset {
            FixedOffset::west_opt(2 * 3600).expect("valid offset")
        }

        fn winter() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).expect("valid offset")
        }
    }

    impl TimeZone for FallBackZone {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Self
        }

        fn offset_from_local_date(&self, _local: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(Self::winter())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_summer = *local + TimeDelta::hours(2) < Self::switch();
            let as_winter = *local + TimeDelta::hours(3) >= Self::switch();
            match (as_summer, as_winter) {
                (true, true) => LocalResult::Ambiguous(Self::summer(), Self::winter()),
                (true, false) => LocalResult::Single(Self::summer()),
                (false, true) => LocalResult::Single(Self::winter()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, _utc: &NaiveDate) -> FixedOffset {
            Self::winter()
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    fn utc(hour: u32, minute: u32) -> SystemTime {
        let naive = NaiveDate::from_ymd_opt(2024, 2, 18)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid utc instant");
        SystemTime::from(naive.and_utc())
    }

    #[test]
    fn repeated_hour_compares_instants() {
        let watermark = Watermark::parse("17/02/2024 23:30:00").expect("valid watermark");

        // 23:30 local first happens at 01:30Z.
        assert!(!watermark.admits_in(&FallBackZone, utc(1, 20)));
        assert!(watermark.admits_in(&FallBackZone, utc(1, 30)));
        // 02:10Z reads 23:10 on the wall clock but is later than the watermark.
        assert!(watermark.admits_in(&FallBackZone, utc(2, 10)));
    }

    #[test]
    fn from_naive_truncates_sub_seconds() {
        let precise = naive(25, 8, 0, 0) + Duration::milliseconds(750);
        assert_eq!(Watermark::from_naive(precise).as_naive(), naive(25, 8, 0, 0));
    }

    #[test]
    fn advance_never_moves_backward() {
        let current = Watermark::from_naive(naive(25, 8, 0, 0));
        let earlier = Local
            .from_local_datetime(&naive(24, 8, 0, 0))
            .earliest()
            .expect("unambiguous local time");
        let later = Local
            .from_local_datetime(&naive(26, 9, 30, 15))
            .earliest()
            .expect("unambiguous local time");

        assert_eq!(current.advance_to(earlier), current);
        assert_eq!(current.advance_to(later).as_naive(), naive(26, 9, 30, 15));
    }

    #[test]
    fn serializes_as_persisted_string() {
        let watermark = Watermark::from_naive(naive(25, 8, 0, 0));
        let json = serde_json::to_string(&watermark).expect("serializable");
        assert_eq!(json, "\"25/04/2017 08:00:00\"");
    }
}
