// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Closed calendar date ranges.
//!
//! All comparisons are on calendar dates, never on elapsed wall-clock time,
//! so DST transitions and timezone offsets cannot move a boundary.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

/// An inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvertedDateRange` if `start > end`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvertedDateRange {
                start_date: start,
                end_date: end,
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day.
    #[must_use]
    pub const fn single(day: Date) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of days in the range, counting both ends.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// Returns whether `day` lies inside the range.
    #[must_use]
    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day <= self.end
    }

    /// Returns whether `other` lies entirely inside this range.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Two ranges intersect iff `a.start <= b.end && b.start <= a.end`.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns the overlapping sub-range, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Removes `cut` from this range, returning the left and right remainders.
    ///
    /// Either side is `None` when nothing of this range lies on that side of `cut`.
    #[must_use]
    pub fn subtract(&self, cut: &Self) -> (Option<Self>, Option<Self>) {
        if !self.intersects(cut) {
            return (Some(*self), None);
        }

        let left: Option<Self> = if self.start < cut.start {
            cut.start.previous_day().map(|end| Self {
                start: self.start,
                end,
            })
        } else {
            None
        };

        let right: Option<Self> = if cut.end < self.end {
            cut.end.next_day().map(|start| Self {
                start,
                end: self.end,
            })
        } else {
            None
        };

        (left, right)
    }

    /// Iterates over every day of the range in order.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end: Date = self.end;
        std::iter::successors(Some(self.start), move |day| {
            if *day >= end { None } else { day.next_day() }
        })
    }

    /// Integer number of calendar days from `from` to `to`.
    #[must_use]
    pub fn days_between(from: Date, to: Date) -> i64 {
        (to - from).whole_days()
    }

    /// Adds whole days to a date.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DateArithmeticOverflow` if the result is out of range.
    pub fn add_days(day: Date, days: i64) -> Result<Date, DomainError> {
        day.checked_add(Duration::days(days))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("adding {days} days to {day}"),
            })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
