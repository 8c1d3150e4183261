//! Calendar Policy — What "Today" Means and Where a Day Starts
//!
//! The API is queried by calendar date and every point is stamped at
//! the start of its day, so both depend on the configured timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Timezone used to resolve calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimezonePolicy {
    Utc,
    /// The host's local timezone (honours `TZ`).
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl TimezonePolicy {
    /// Calendar date of `now` in this timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Utc => now.date_naive(),
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => now.with_timezone(offset).date_naive(),
        }
    }

    /// Instant at which `date` starts in this timezone.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            Self::Utc => Utc.from_utc_datetime(&midnight),
            Self::Fixed(offset) => Utc.from_utc_datetime(
                &(midnight - Duration::seconds(i64::from(offset.local_minus_utc()))),
            ),
            // Midnight can fall in a DST gap; use UTC midnight then.
            Self::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&midnight), |d| d.with_timezone(&Utc)),
        }
    }
}

impl fmt::Display for TimezonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => write!(f, "utc"),
            Self::Local => write!(f, "local"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timezone '{0}': expected \"utc\", \"local\" or an offset like \"+05:30\"")]
pub struct InvalidTimezone(pub String);

impl FromStr for TimezonePolicy {
    type Err = InvalidTimezone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "utc" | "z" => return Ok(Self::Utc),
            "local" => return Ok(Self::Local),
            _ => {}
        }
        parse_offset(trimmed)
            .map(Self::Fixed)
            .ok_or_else(|| InvalidTimezone(s.to_string()))
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM` or `+HH`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Inclusive range of calendar dates requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryWindow {
    /// Window ending on `end` and reaching `lookback_days` back.
    pub fn ending_on(end: NaiveDate, lookback_days: u32) -> Self {
        let start = end - Duration::days(i64::from(lookback_days));
        Self { start, end }
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!("UTC".parse::<TimezonePolicy>(), Ok(TimezonePolicy::Utc));
        assert_eq!("local".parse::<TimezonePolicy>(), Ok(TimezonePolicy::Local));
        assert_eq!(
            "+05:30".parse::<TimezonePolicy>(),
            Ok(TimezonePolicy::Fixed(FixedOffset::east_opt(19_800).unwrap()))
        );
        assert_eq!(
            "-0800".parse::<TimezonePolicy>(),
            Ok(TimezonePolicy::Fixed(FixedOffset::west_opt(28_800).unwrap()))
        );
        assert_eq!(
            "+02".parse::<TimezonePolicy>(),
            Ok(TimezonePolicy::Fixed(FixedOffset::east_opt(7_200).unwrap()))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "Europe/Paris", "+5:3", "+25:00", "+05:75", "05:30"] {
            assert!(bad.parse::<TimezonePolicy>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_today_respects_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        let ist: TimezonePolicy = "+05:30".parse().unwrap();
        assert_eq!(TimezonePolicy::Utc.today(now), date(2024, 3, 10));
        assert_eq!(ist.today(now), date(2024, 3, 11));
    }

    #[test]
    fn test_day_start() {
        let d = date(2024, 3, 11);
        assert_eq!(
            TimezonePolicy::Utc.day_start(d),
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
        );
        let ist: TimezonePolicy = "+05:30".parse().unwrap();
        assert_eq!(
            ist.day_start(d),
            Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap()
        );
        let pst: TimezonePolicy = "-08:00".parse().unwrap();
        assert_eq!(
            pst.day_start(d),
            Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window() {
        let w = QueryWindow::ending_on(date(2024, 3, 1), 1);
        assert_eq!(w.start, date(2024, 2, 29));
        assert_eq!(w.end, date(2024, 3, 1));
        let today_only = QueryWindow::ending_on(date(2024, 3, 1), 0);
        assert_eq!(today_only.start, today_only.end);
        assert_eq!(w.to_string(), "2024-02-29..=2024-03-01");
    }
}
