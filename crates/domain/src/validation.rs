// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parsing and formatting of wire-level date and time strings.
//!
//! Dates are `YYYY-MM-DD`. Clock-of-day values accept `HH:MM` or `HH:MM:SS`
//! and are always written back as `HH:MM:SS`. Local date-times accept a `T`
//! or a space between the date and the clock part.

use crate::date_range::DateRange;
use crate::error::DomainError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]:[second]");
const SHORT_TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` for malformed input.
pub fn parse_date(s: &str) -> Result<Date, DomainError> {
    Date::parse(s.trim(), DATE_FORMAT).map_err(|e| DomainError::DateParseError {
        date_string: s.to_string(),
        error: e.to_string(),
    })
}

/// Parses an inclusive date range from two `YYYY-MM-DD` strings.
///
/// # Errors
///
/// Returns an error for malformed input or when start is after end.
pub fn parse_date_range(start: &str, end: &str) -> Result<DateRange, DomainError> {
    DateRange::new(parse_date(start)?, parse_date(end)?)
}

/// Parses an `HH:MM` or `HH:MM:SS` clock-of-day value.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` for malformed input.
pub fn parse_clock_time(s: &str) -> Result<Time, DomainError> {
    let trimmed: &str = s.trim();
    let format: &[BorrowedFormatItem<'_>] = if trimmed.len() <= 5 {
        SHORT_TIME_FORMAT
    } else {
        TIME_FORMAT
    };
    Time::parse(trimmed, format).map_err(|e| DomainError::DateParseError {
        date_string: s.to_string(),
        error: e.to_string(),
    })
}

/// Parses a local `YYYY-MM-DDTHH:MM[:SS]` date-time.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` for malformed input.
pub fn parse_local_datetime(s: &str) -> Result<PrimitiveDateTime, DomainError> {
    let trimmed: &str = s.trim();
    let (date_part, time_part) = trimmed
        .split_once(['T', ' '])
        .ok_or_else(|| DomainError::DateParseError {
            date_string: s.to_string(),
            error: String::from("expected a date and a time separated by 'T'"),
        })?;
    Ok(PrimitiveDateTime::new(
        parse_date(date_part)?,
        parse_clock_time(time_part)?,
    ))
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(d: Date) -> String {
    d.format(DATE_FORMAT).unwrap_or_else(|_| d.to_string())
}

/// Formats a clock-of-day value as `HH:MM:SS`.
#[must_use]
pub fn format_clock_time(t: Time) -> String {
    t.format(TIME_FORMAT).unwrap_or_else(|_| t.to_string())
}

/// Formats a local date-time as `YYYY-MM-DDTHH:MM:SS`.
#[must_use]
pub fn format_local_datetime(dt: PrimitiveDateTime) -> String {
    format!(
        "{}T{}",
        format_date(dt.date()),
        format_clock_time(dt.time())
    )
}
