// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Circular clock-of-day arithmetic and the day-shifted work timeline.
//!
//! Clock-of-day values live on a 24-hour circle. A window `[start, end]`
//! whose end is earlier than its start wraps past midnight. Absolute
//! positions are anchored to a work date: a clock-of-day earlier than the
//! configured day switch time belongs to the calendar day after the work date.

use crate::date_range::DateRange;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, PrimitiveDateTime, Time};

/// Seconds in one day on the circular clock.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds since midnight for a clock-of-day value.
#[must_use]
pub fn seconds_of_day(t: Time) -> i64 {
    i64::from(t.hour()) * 3_600 + i64::from(t.minute()) * 60 + i64::from(t.second())
}

/// Forward distance in seconds from `from` to `to` on the circular clock.
///
/// Always in `[0, SECONDS_PER_DAY)`.
#[must_use]
pub fn forward_seconds(from: Time, to: Time) -> i64 {
    (seconds_of_day(to) - seconds_of_day(from)).rem_euclid(SECONDS_PER_DAY)
}

/// A clock-of-day window that may cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockWindow {
    start: Time,
    end: Time,
}

impl ClockWindow {
    /// Creates a window from its opening and closing clock-of-day values.
    #[must_use]
    pub const fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    /// Opening time.
    #[must_use]
    pub const fn start(&self) -> Time {
        self.start
    }

    /// Closing time.
    #[must_use]
    pub const fn end(&self) -> Time {
        self.end
    }

    /// Length of the window in seconds.
    #[must_use]
    pub fn span_seconds(&self) -> i64 {
        forward_seconds(self.start, self.end)
    }

    /// Returns whether `t` lies inside the window on the circular clock.
    #[must_use]
    pub fn contains(&self, t: Time) -> bool {
        forward_seconds(self.start, t) <= self.span_seconds()
    }

    /// Resolves this window around an absolute anchor that must lie inside it.
    ///
    /// The anchor's clock-of-day is located on the circle and the window is
    /// stretched backwards and forwards from it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DateArithmeticOverflow` when the window would
    /// leave the representable calendar.
    pub fn around(&self, anchor: PrimitiveDateTime) -> Result<AbsoluteWindow, DomainError> {
        let before: i64 = forward_seconds(self.start, anchor.time());
        let after: i64 = forward_seconds(anchor.time(), self.end);
        let overflow = || DomainError::DateArithmeticOverflow {
            operation: format!("resolving window around {anchor}"),
        };
        Ok(AbsoluteWindow {
            start: anchor
                .checked_sub(Duration::seconds(before))
                .ok_or_else(overflow)?,
            end: anchor
                .checked_add(Duration::seconds(after))
                .ok_or_else(overflow)?,
        })
    }
}

/// A window on the absolute local timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsoluteWindow {
    /// Inclusive opening instant.
    pub start: PrimitiveDateTime,
    /// Inclusive closing instant.
    pub end: PrimitiveDateTime,
}

impl AbsoluteWindow {
    /// Returns whether `at` lies inside the window, both ends inclusive.
    #[must_use]
    pub fn contains(&self, at: PrimitiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    /// Returns whether the half-open spans `[start, end)` of both windows share any instant.
    #[must_use]
    pub fn overlaps(&self, other_start: PrimitiveDateTime, other_end: PrimitiveDateTime) -> bool {
        self.start < other_end && other_start < self.end
    }
}

/// Anchors a clock-of-day value to a work date on the day-shifted timeline.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` at the end of the calendar.
pub fn anchor_to_work_date(
    work_date: Date,
    clock: Time,
    day_switch: Time,
) -> Result<PrimitiveDateTime, DomainError> {
    let day: Date = if clock < day_switch {
        DateRange::add_days(work_date, 1)?
    } else {
        work_date
    };
    Ok(PrimitiveDateTime::new(day, clock))
}

/// Returns the work date a local wall-clock instant belongs to.
#[must_use]
pub fn work_date_of(at: PrimitiveDateTime, day_switch: Time) -> Date {
    if at.time() < day_switch {
        at.date().previous_day().unwrap_or_else(|| at.date())
    } else {
        at.date()
    }
}

/// The local span `[start, end)` covered by a work date.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` at the end of the calendar.
pub fn work_day_bounds(
    work_date: Date,
    day_switch: Time,
) -> Result<(PrimitiveDateTime, PrimitiveDateTime), DomainError> {
    let start: PrimitiveDateTime = PrimitiveDateTime::new(work_date, day_switch);
    let end: PrimitiveDateTime =
        PrimitiveDateTime::new(DateRange::add_days(work_date, 1)?, day_switch);
    Ok((start, end))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn test_window_contains_handles_midnight_wrap() {
        let window = ClockWindow::new(time!(23:00), time!(01:00));
        assert!(window.contains(time!(23:30)));
        assert!(window.contains(time!(00:00)));
        assert!(window.contains(time!(01:00)));
        assert!(!window.contains(time!(02:00)));
        assert!(!window.contains(time!(22:59)));
    }

    #[test]
    fn test_around_stretches_across_midnight() {
        let window = ClockWindow::new(time!(23:30), time!(00:30));
        let resolved = window.around(datetime!(2024-03-02 00:00)).unwrap();
        assert_eq!(resolved.start, datetime!(2024-03-01 23:30));
        assert_eq!(resolved.end, datetime!(2024-03-02 00:30));
    }

    #[test]
    fn test_around_at_end_of_calendar_is_an_error() {
        let window = ClockWindow::new(time!(23:00), time!(01:00));
        assert!(matches!(
            window.around(datetime!(9999-12-31 23:30)),
            Err(DomainError::DateArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_anchor_uses_day_switch() {
        let switch = time!(04:00);
        assert_eq!(
            anchor_to_work_date(date!(2024 - 03 - 01), time!(02:00), switch).unwrap(),
            datetime!(2024-03-02 02:00)
        );
        assert_eq!(
            anchor_to_work_date(date!(2024 - 03 - 01), time!(09:00), switch).unwrap(),
            datetime!(2024-03-01 09:00)
        );
    }

    #[test]
    fn test_work_date_of_early_morning_belongs_to_previous_day() {
        let switch = time!(04:00);
        assert_eq!(
            work_date_of(datetime!(2024-03-02 03:59), switch),
            date!(2024 - 03 - 01)
        );
        assert_eq!(
            work_date_of(datetime!(2024-03-02 04:00), switch),
            date!(2024 - 03 - 02)
        );
    }
}
