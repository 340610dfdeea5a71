// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, format_clock_time, format_local_datetime, parse_clock_time, parse_date,
    parse_date_range, parse_local_datetime,
};
use time::macros::{date, datetime, time};

#[test]
fn test_parse_date_accepts_iso_dates() {
    assert_eq!(parse_date("2024-02-29").unwrap(), date!(2024 - 02 - 29));
}

#[test]
fn test_parse_date_rejects_invalid_calendar_day() {
    let result = parse_date("2023-02-29");
    assert!(matches!(result, Err(DomainError::DateParseError { .. })));
}

#[test]
fn test_parse_date_range_rejects_inverted_range() {
    let result = parse_date_range("2024-01-10", "2024-01-01");
    assert!(matches!(result, Err(DomainError::InvertedDateRange { .. })));
}

#[test]
fn test_parse_clock_time_accepts_short_and_long_forms() {
    assert_eq!(parse_clock_time("09:30").unwrap(), time!(09:30));
    assert_eq!(parse_clock_time("23:59:59").unwrap(), time!(23:59:59));
    assert!(parse_clock_time("24:00").is_err());
    assert!(parse_clock_time("9am").is_err());
}

#[test]
fn test_parse_local_datetime_accepts_t_or_space() {
    assert_eq!(
        parse_local_datetime("2024-03-01T08:55").unwrap(),
        datetime!(2024-03-01 08:55)
    );
    assert_eq!(
        parse_local_datetime("2024-03-01 08:55:10").unwrap(),
        datetime!(2024-03-01 08:55:10)
    );
    assert!(parse_local_datetime("2024-03-01").is_err());
}

#[test]
fn test_formatting_is_zero_padded() {
    assert_eq!(format_clock_time(time!(07:05)), "07:05:00");
    assert_eq!(
        format_local_datetime(datetime!(2024-03-01 07:05)),
        "2024-03-01T07:05:00"
    );
}
