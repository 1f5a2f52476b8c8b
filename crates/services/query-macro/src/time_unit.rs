//! Calendar units used by relative date macros.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use chrono_tz::Tz;
use common::{AppError, AppResult};

/// Unit of a relative date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Parse a unit name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            "hour" => Some(Self::Hour),
            "minute" => Some(Self::Minute),
            "second" => Some(Self::Second),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }

    /// Start of the unit containing `now`, shifted by `offset` units.
    pub fn boundary(&self, now: &DateTime<Tz>, offset: i64) -> AppResult<DateTime<Tz>> {
        let zone = now.timezone();
        let local = now.naive_local();
        let date = local.date();

        match self {
            Self::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).ok_or_else(out_of_range)?;
                let shifted = add_months(start.and_time(NaiveTime::MIN), offset.checked_mul(12))?;
                localize(&zone, shifted)
            }
            Self::Month => {
                let start = date.with_day(1).ok_or_else(out_of_range)?;
                let shifted = add_months(start.and_time(NaiveTime::MIN), Some(offset))?;
                localize(&zone, shifted)
            }
            Self::Day => {
                let shifted = Duration::try_days(offset)
                    .and_then(|days| date.and_time(NaiveTime::MIN).checked_add_signed(days))
                    .ok_or_else(out_of_range)?;
                localize(&zone, shifted)
            }
            Self::Hour => {
                let start = truncate_instant(now, local.minute() * 60 + local.second())?;
                shift(start, Duration::try_hours(offset))
            }
            Self::Minute => {
                let start = truncate_instant(now, local.second())?;
                shift(start, Duration::try_minutes(offset))
            }
            Self::Second => shift(truncate_instant(now, 0)?, Duration::try_seconds(offset)),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start of `date` in `zone`.
pub fn start_of_day(zone: &Tz, date: NaiveDate) -> AppResult<DateTime<Tz>> {
    localize(zone, date.and_time(NaiveTime::MIN))
}

/// Resolve a local wall-clock time, taking the earlier instant when it is
/// ambiguous and moving past a gap when it does not exist.
fn localize(zone: &Tz, local: NaiveDateTime) -> AppResult<DateTime<Tz>> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            local
                .checked_add_signed(Duration::hours(1))
                .and_then(|later| zone.from_local_datetime(&later).earliest())
        })
        .ok_or_else(out_of_range)
}

/// Move `now` back by `seconds` and drop the sub-second part. Works on the
/// instant so a repeated wall-clock hour keeps its own offset.
fn truncate_instant(now: &DateTime<Tz>, seconds: u32) -> AppResult<DateTime<Tz>> {
    now.with_nanosecond(0)
        .and_then(|whole| whole.checked_sub_signed(Duration::seconds(i64::from(seconds))))
        .ok_or_else(out_of_range)
}

fn add_months(local: NaiveDateTime, months: Option<i64>) -> AppResult<NaiveDateTime> {
    let months = months.ok_or_else(out_of_range)?;
    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| out_of_range())?;
    let shifted = if months >= 0 {
        local.checked_add_months(Months::new(magnitude))
    } else {
        local.checked_sub_months(Months::new(magnitude))
    };
    shifted.ok_or_else(out_of_range)
}

fn shift(start: DateTime<Tz>, delta: Option<Duration>) -> AppResult<DateTime<Tz>> {
    delta
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> AppError {
    AppError::bad_request("Date is out of range")
}
