//! Calendar-aware window arithmetic. Every instant is UTC.
//!
//! Year and month lengths depend on where they start, so spans in those
//! units are always measured from an anchor (normally the window start).
//! Weeks, days and hours are fixed.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::core::{
    constants::{SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_WEEK},
    error::TimeError,
};

/// Average Gregorian lengths, used only if the calendar runs out of range.
const AVG_SECS_PER_YEAR: f64 = 31_556_952.0;
const AVG_SECS_PER_MONTH: f64 = AVG_SECS_PER_YEAR / 12.0;

/// Unit letter of a relative time token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpanUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
}

impl SpanUnit {
    #[must_use]
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Year),
            'm' => Some(Self::Month),
            'w' => Some(Self::Week),
            'd' => Some(Self::Day),
            'h' => Some(Self::Hour),
            _ => None,
        }
    }
}

/// Seconds covered by `length` units, measured from `start`.
///
/// A calendar unit is one unit from `start` scaled by `length`, so
/// `span_seconds(2.0, Month, jan_15)` is twice the January 15 to
/// February 15 distance.
#[must_use]
pub fn span_seconds(length: f64, unit: SpanUnit, start: DateTime<Utc>) -> f64 {
    let one = match unit {
        SpanUnit::Year => add_years(start, 1)
            .map_or(AVG_SECS_PER_YEAR, |next| seconds_between(start, next)),
        SpanUnit::Month => add_months(start, 1)
            .map_or(AVG_SECS_PER_MONTH, |next| seconds_between(start, next)),
        SpanUnit::Week => SECS_PER_WEEK,
        SpanUnit::Day => SECS_PER_DAY,
        SpanUnit::Hour => SECS_PER_HOUR,
    };
    one * length
}

/// Signed distance `to - from` in (fractional) seconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1_000.0
}

/// Move `t` by `secs` (may be negative), millisecond resolution.
pub fn offset(t: DateTime<Utc>, secs: f64) -> Result<DateTime<Utc>, TimeError> {
    let millis = (secs * 1_000.0).round();
    if !millis.is_finite() || millis.abs() >= 9.0e15 {
        return Err(TimeError::OutOfRange);
    }
    #[allow(clippy::cast_possible_truncation)]
    let delta = TimeDelta::try_milliseconds(millis as i64).ok_or(TimeError::OutOfRange)?;
    t.checked_add_signed(delta).ok_or(TimeError::OutOfRange)
}

/// `n` calendar months later. A day past the end of the target month lands
/// on its last day (Jan 31 + 1 month = Feb 28/29).
#[must_use]
pub fn add_months(t: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
    t.checked_add_months(Months::new(n))
}

/// `n` calendar months earlier, same end-of-month rule as [`add_months`].
#[must_use]
pub fn sub_months(t: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
    t.checked_sub_months(Months::new(n))
}

#[must_use]
pub fn add_years(t: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
    add_months(t, n.checked_mul(12)?)
}

#[must_use]
pub fn sub_years(t: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
    sub_months(t, n.checked_mul(12)?)
}

/// Midnight on the first day of `t`'s month.
#[must_use]
pub fn month_start(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(t.year(), t.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(t)
}

/// Midnight on January 1 of year `year`.
pub fn year_start(year: i32) -> Result<DateTime<Utc>, TimeError> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or(TimeError::OutOfRange)
}

/// Parse a loose UTC literal such as `2013-04-05 06:07:08`, `20130405` or
/// `2013/4/5T6`.
///
/// The first run of four digits is the year. Each later field is at most
/// two digits, separated by any non-digits. Absent fields default to the
/// start of the enclosing period.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, TimeError> {
    let bytes = text.as_bytes();
    let year_at = bytes
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .ok_or_else(|| TimeError::MissingYear(text.to_owned()))?;

    let mut fields = [0u32; 6];
    fields[0] = digits_value(&bytes[year_at..year_at + 4]);
    let mut seen = 1;
    let mut pos = year_at + 4;
    while seen < fields.len() {
        while pos < bytes.len() && !bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == bytes.len() {
            break;
        }
        let end = bytes[pos..]
            .iter()
            .take(2)
            .take_while(|b| b.is_ascii_digit())
            .count()
            + pos;
        fields[seen] = digits_value(&bytes[pos..end]);
        seen += 1;
        pos = end;
    }

    let [year, month, day, hour, min, sec] = fields;
    let month = if seen > 1 { month } else { 1 };
    let day = if seen > 2 { day } else { 1 };
    #[allow(clippy::cast_possible_wrap)]
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimeError::InvalidLiteral(text.to_owned()))
}

fn digits_value(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}
