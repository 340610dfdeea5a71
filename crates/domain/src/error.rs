// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Time};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A date range has its start after its end.
    InvertedDateRange {
        /// The requested start date.
        start_date: Date,
        /// The requested end date.
        end_date: Date,
    },
    /// A name field is empty or invalid.
    InvalidName(String),
    /// A time period definition is invalid.
    InvalidTimePeriod {
        /// Description of the violated rule.
        reason: String,
    },
    /// A shift definition is invalid.
    InvalidShift {
        /// Description of the violated rule.
        reason: String,
    },
    /// A shift references a cycle position outside `[1, cycle_days]`.
    DayOfCycleOutOfRange {
        /// The offending position.
        day_of_cycle: u16,
        /// The shift's cycle length.
        cycle_days: u16,
    },
    /// An assignment was evaluated against a shift it does not reference.
    ShiftMismatch {
        /// The shift the assignment references.
        expected: i64,
        /// The shift that was supplied.
        actual: i64,
    },
    /// Attendance settings are invalid.
    InvalidSettings {
        /// Description of the violated rule.
        reason: String,
    },
    /// The configured timezone is not a known IANA zone.
    InvalidTimezone(String),
    /// A leave or correction record is invalid.
    InvalidRecord {
        /// Description of the violated rule.
        reason: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse a date, time, or date-time string.
    DateParseError {
        /// The invalid input string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A clock-of-day window does not contain the time it must straddle.
    WindowDoesNotStraddle {
        /// Which window failed (`check_in` or `check_out`).
        window: &'static str,
        /// The time the window must contain.
        anchor: Time,
    },
    /// Employee does not exist.
    EmployeeNotFound(i64),
    /// Employee exists but is not active.
    EmployeeInactive(i64),
    /// Department does not exist.
    DepartmentNotFound(i64),
    /// Shift does not exist.
    ShiftNotFound(i64),
    /// Time period does not exist.
    TimePeriodNotFound(i64),
    /// Schedule assignment does not exist.
    AssignmentNotFound(i64),
    /// The candidate assignment intersects existing assignments.
    ScheduleConflict {
        /// The employee being scheduled.
        employee_id: i64,
        /// Every intersecting assignment with its overlapping sub-range.
        conflicts: Vec<crate::ConflictDetail>,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvertedDateRange {
                start_date,
                end_date,
            } => {
                write!(
                    f,
                    "Start date {start_date} must not be after end date {end_date}"
                )
            }
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidTimePeriod { reason } => write!(f, "Invalid time period: {reason}"),
            Self::InvalidShift { reason } => write!(f, "Invalid shift: {reason}"),
            Self::DayOfCycleOutOfRange {
                day_of_cycle,
                cycle_days,
            } => {
                write!(
                    f,
                    "Day of cycle {day_of_cycle} is outside the cycle range 1..={cycle_days}"
                )
            }
            Self::ShiftMismatch { expected, actual } => {
                write!(
                    f,
                    "Assignment references shift {expected} but shift {actual} was supplied"
                )
            }
            Self::InvalidSettings { reason } => write!(f, "Invalid attendance settings: {reason}"),
            Self::InvalidTimezone(tz) => write!(f, "Unknown timezone '{tz}'"),
            Self::InvalidRecord { reason } => write!(f, "Invalid record: {reason}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse '{date_string}': {error}")
            }
            Self::WindowDoesNotStraddle { window, anchor } => {
                write!(
                    f,
                    "The {window} window must contain {:02}:{:02}:{:02}",
                    anchor.hour(),
                    anchor.minute(),
                    anchor.second()
                )
            }
            Self::EmployeeNotFound(id) => write!(f, "Employee {id} not found"),
            Self::EmployeeInactive(id) => write!(f, "Employee {id} is not active"),
            Self::DepartmentNotFound(id) => write!(f, "Department {id} not found"),
            Self::ShiftNotFound(id) => write!(f, "Shift {id} not found"),
            Self::TimePeriodNotFound(id) => write!(f, "Time period {id} not found"),
            Self::AssignmentNotFound(id) => write!(f, "Schedule assignment {id} not found"),
            Self::ScheduleConflict {
                employee_id,
                conflicts,
            } => {
                let ids: Vec<String> = conflicts
                    .iter()
                    .map(|c| c.assignment_id.to_string())
                    .collect();
                write!(
                    f,
                    "Employee {employee_id} already has overlapping assignments: {}",
                    ids.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}

impl DomainError {
    /// Returns whether this error is a validation failure detected before any lookup.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvertedDateRange { .. }
                | Self::InvalidName(_)
                | Self::InvalidTimePeriod { .. }
                | Self::InvalidShift { .. }
                | Self::DayOfCycleOutOfRange { .. }
                | Self::InvalidSettings { .. }
                | Self::InvalidTimezone(_)
                | Self::InvalidRecord { .. }
                | Self::DateParseError { .. }
                | Self::WindowDoesNotStraddle { .. }
        )
    }
}
