// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reusable work windows.
//!
//! A time period is immutable once stored. Changing one means creating a
//! replacement and repointing every shift that referenced the original.

use crate::clock::{
    AbsoluteWindow, ClockWindow, SECONDS_PER_DAY, anchor_to_work_date, forward_seconds,
};
use crate::error::DomainError;
use crate::validation::format_clock_time;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, PrimitiveDateTime, Time};

/// Upper bound for grace configuration, one full day.
pub const MAX_GRACE_MINUTES: u32 = 1_440;

/// How lateness and early leave are measured for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    /// Arrival and departure are measured against the start and end times.
    Fixed,
    /// Arrival is measured against the close of the check-in window, and the
    /// required duration runs from the actual check-in.
    Flexible,
}

impl PeriodKind {
    /// Returns the storage and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Flexible => "flexible",
        }
    }

    /// Parses the storage and wire representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimePeriod` for unknown values.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "flexible" => Ok(Self::Flexible),
            other => Err(DomainError::InvalidTimePeriod {
                reason: format!("unknown period type '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named work window with its check-in and check-out tolerances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// `None` until persisted.
    period_id: Option<i64>,
    name: String,
    kind: PeriodKind,
    start_time: Time,
    end_time: Time,
    rest: Option<ClockWindow>,
    check_in_window: ClockWindow,
    check_out_window: ClockWindow,
    late_grace_minutes: u32,
    early_leave_grace_minutes: u32,
    replaced_by: Option<i64>,
}

impl TimePeriod {
    /// Creates an unpersisted period with no rest window and zero grace.
    #[must_use]
    pub fn new(
        name: &str,
        kind: PeriodKind,
        start_time: Time,
        end_time: Time,
        check_in_window: ClockWindow,
        check_out_window: ClockWindow,
    ) -> Self {
        Self {
            period_id: None,
            name: name.trim().to_string(),
            kind,
            start_time,
            end_time,
            rest: None,
            check_in_window,
            check_out_window,
            late_grace_minutes: 0,
            early_leave_grace_minutes: 0,
            replaced_by: None,
        }
    }

    /// Sets the rest window.
    #[must_use]
    pub const fn with_rest(mut self, rest: Option<ClockWindow>) -> Self {
        self.rest = rest;
        self
    }

    /// Sets the late and early-leave grace in minutes.
    #[must_use]
    pub const fn with_grace(mut self, late: u32, early_leave: u32) -> Self {
        self.late_grace_minutes = late;
        self.early_leave_grace_minutes = early_leave;
        self
    }

    /// Attaches the persisted identifier.
    #[must_use]
    pub const fn with_id(mut self, period_id: i64) -> Self {
        self.period_id = Some(period_id);
        self
    }

    /// Records the period that superseded this one.
    #[must_use]
    pub const fn with_replaced_by(mut self, replaced_by: Option<i64>) -> Self {
        self.replaced_by = replaced_by;
        self
    }

    #[must_use]
    pub const fn period_id(&self) -> Option<i64> {
        self.period_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> PeriodKind {
        self.kind
    }

    #[must_use]
    pub const fn start_time(&self) -> Time {
        self.start_time
    }

    #[must_use]
    pub const fn end_time(&self) -> Time {
        self.end_time
    }

    #[must_use]
    pub const fn rest(&self) -> Option<ClockWindow> {
        self.rest
    }

    #[must_use]
    pub const fn check_in_window(&self) -> ClockWindow {
        self.check_in_window
    }

    #[must_use]
    pub const fn check_out_window(&self) -> ClockWindow {
        self.check_out_window
    }

    #[must_use]
    pub const fn late_grace_minutes(&self) -> u32 {
        self.late_grace_minutes
    }

    #[must_use]
    pub const fn early_leave_grace_minutes(&self) -> u32 {
        self.early_leave_grace_minutes
    }

    #[must_use]
    pub const fn replaced_by(&self) -> Option<i64> {
        self.replaced_by
    }

    /// Length of the period in seconds. An end equal to the start is a full day.
    #[must_use]
    pub fn length_seconds(&self) -> i64 {
        match forward_seconds(self.start_time, self.end_time) {
            0 => SECONDS_PER_DAY,
            n => n,
        }
    }

    /// Validates the period definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, a window does not straddle its
    /// anchor, the rest window leaves the work window, or grace is out of range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::InvalidName(String::from(
                "Time period name cannot be empty",
            )));
        }

        if !self.check_in_window.contains(self.start_time) {
            return Err(DomainError::WindowDoesNotStraddle {
                window: "check_in",
                anchor: self.start_time,
            });
        }

        if !self.check_out_window.contains(self.end_time) {
            return Err(DomainError::WindowDoesNotStraddle {
                window: "check_out",
                anchor: self.end_time,
            });
        }

        if let Some(rest) = self.rest {
            let offset: i64 = forward_seconds(self.start_time, rest.start());
            if offset + rest.span_seconds() > self.length_seconds() {
                return Err(DomainError::InvalidTimePeriod {
                    reason: format!(
                        "rest window {}-{} must lie inside {}-{}",
                        format_clock_time(rest.start()),
                        format_clock_time(rest.end()),
                        format_clock_time(self.start_time),
                        format_clock_time(self.end_time)
                    ),
                });
            }
        }

        if self.late_grace_minutes > MAX_GRACE_MINUTES
            || self.early_leave_grace_minutes > MAX_GRACE_MINUTES
        {
            return Err(DomainError::InvalidTimePeriod {
                reason: format!("grace must not exceed {MAX_GRACE_MINUTES} minutes"),
            });
        }

        Ok(())
    }

    /// Places this period on the absolute timeline of a work date.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DateArithmeticOverflow` at the end of the calendar.
    pub fn resolve(&self, work_date: Date, day_switch: Time) -> Result<ExpectedPeriod, DomainError> {
        let overflow = || DomainError::DateArithmeticOverflow {
            operation: format!("resolving period '{}' on {work_date}", self.name),
        };
        let start: PrimitiveDateTime = anchor_to_work_date(work_date, self.start_time, day_switch)?;
        let end: PrimitiveDateTime = start
            .checked_add(Duration::seconds(self.length_seconds()))
            .ok_or_else(overflow)?;

        let rest: Option<AbsoluteWindow> = self
            .rest
            .map(|r| -> Result<AbsoluteWindow, DomainError> {
                let rest_start: PrimitiveDateTime = start
                    .checked_add(Duration::seconds(forward_seconds(self.start_time, r.start())))
                    .ok_or_else(overflow)?;
                let rest_end: PrimitiveDateTime = rest_start
                    .checked_add(Duration::seconds(r.span_seconds()))
                    .ok_or_else(overflow)?;
                Ok(AbsoluteWindow {
                    start: rest_start,
                    end: rest_end,
                })
            })
            .transpose()?;

        Ok(ExpectedPeriod {
            period_id: self.period_id.unwrap_or_default(),
            name: self.name.clone(),
            kind: self.kind,
            start,
            end,
            check_in: self.check_in_window.around(start)?,
            check_out: self.check_out_window.around(end)?,
            rest,
            late_grace_minutes: self.late_grace_minutes,
            early_leave_grace_minutes: self.early_leave_grace_minutes,
        })
    }
}

/// A time period resolved to absolute local instants for one work date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedPeriod {
    pub period_id: i64,
    pub name: String,
    pub kind: PeriodKind,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub check_in: AbsoluteWindow,
    pub check_out: AbsoluteWindow,
    pub rest: Option<AbsoluteWindow>,
    pub late_grace_minutes: u32,
    pub early_leave_grace_minutes: u32,
}

impl ExpectedPeriod {
    /// The full span in which attendance for this period is evaluated.
    #[must_use]
    pub fn evaluation_window(&self) -> AbsoluteWindow {
        AbsoluteWindow {
            start: self.check_in.start.min(self.start),
            end: self.check_out.end.max(self.end),
        }
    }

    /// Required working seconds, start to end.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
