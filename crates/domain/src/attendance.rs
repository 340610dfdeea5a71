// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attendance inputs and the daily record produced from them.

use crate::clock::work_date_of;
use crate::error::DomainError;
use crate::time_period::ExpectedPeriod;
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime, Time};

/// Direction of a clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockType {
    SignIn,
    SignOut,
}

impl ClockType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignOut => "sign_out",
        }
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` for unknown values.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "sign_in" => Ok(Self::SignIn),
            "sign_out" => Ok(Self::SignOut),
            other => Err(DomainError::InvalidRecord {
                reason: format!("unknown clock type '{other}'"),
            }),
        }
    }
}

/// Where a clock event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockSource {
    Device,
    Manual,
    /// Synthesized from an approved correction.
    Correction,
}

impl ClockSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Manual => "manual",
            Self::Correction => "correction",
        }
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` for unknown values.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "device" => Ok(Self::Device),
            "manual" => Ok(Self::Manual),
            "correction" => Ok(Self::Correction),
            other => Err(DomainError::InvalidRecord {
                reason: format!("unknown clock source '{other}'"),
            }),
        }
    }
}

/// An immutable clock event in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRecord {
    pub record_id: i64,
    pub employee_id: i64,
    pub clock_time: PrimitiveDateTime,
    pub clock_type: ClockType,
    pub source: ClockSource,
}

/// Leave categories. Business travel is reported with its own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveCategory {
    Annual,
    Sick,
    Personal,
    BusinessTrip,
    Other,
}

impl LeaveCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Sick => "sick",
            Self::Personal => "personal",
            Self::BusinessTrip => "business_trip",
            Self::Other => "other",
        }
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` for unknown values.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "annual" => Ok(Self::Annual),
            "sick" => Ok(Self::Sick),
            "personal" => Ok(Self::Personal),
            "business_trip" => Ok(Self::BusinessTrip),
            "other" => Ok(Self::Other),
            other => Err(DomainError::InvalidRecord {
                reason: format!("unknown leave category '{other}'"),
            }),
        }
    }
}

/// A leave or business trip spanning local date-times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub leave_id: i64,
    pub employee_id: i64,
    pub category: LeaveCategory,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub approved: bool,
}

impl LeaveRecord {
    /// Validates that the leave covers a positive span.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` when `end` is not after `start`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end <= self.start {
            return Err(DomainError::InvalidRecord {
                reason: format!("leave end {} must be after start {}", self.end, self.start),
            });
        }
        Ok(())
    }
}

/// A request to add a missing or wrong clock event for a work date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub correction_id: i64,
    pub employee_id: i64,
    pub work_date: Date,
    pub clock_type: ClockType,
    pub clock_time: PrimitiveDateTime,
    pub reason: String,
    pub approved: bool,
    /// The synthetic clock record produced once approved.
    pub clock_record_id: Option<i64>,
}

impl CorrectionRecord {
    /// Checks the reason and that the clock time falls inside the corrected
    /// work date under `day_switch`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` when no reason is given or the
    /// clock time belongs to another work date.
    pub fn validate(&self, day_switch: Time) -> Result<(), DomainError> {
        if self.reason.trim().is_empty() {
            return Err(DomainError::InvalidRecord {
                reason: String::from("correction reason cannot be empty"),
            });
        }
        let lands_on: Date = work_date_of(self.clock_time, day_switch);
        if lands_on != self.work_date {
            return Err(DomainError::InvalidRecord {
                reason: format!(
                    "correction clock time {} belongs to work date {lands_on}, not {}",
                    self.clock_time, self.work_date
                ),
            });
        }
        Ok(())
    }
}

/// Outcome of a work date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Normal,
    Late,
    EarlyLeave,
    Absent,
    Leave,
    BusinessTrip,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Late => "late",
            Self::EarlyLeave => "early_leave",
            Self::Absent => "absent",
            Self::Leave => "leave",
            Self::BusinessTrip => "business_trip",
        }
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecord` for unknown values.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "normal" => Ok(Self::Normal),
            "late" => Ok(Self::Late),
            "early_leave" => Ok(Self::EarlyLeave),
            "absent" => Ok(Self::Absent),
            "leave" => Ok(Self::Leave),
            "business_trip" => Ok(Self::BusinessTrip),
            other => Err(DomainError::InvalidRecord {
                reason: format!("unknown attendance status '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The computed attendance of one employee on one work date.
///
/// `status` is `None` on a rest day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub employee_id: i64,
    pub work_date: Date,
    pub assignment_id: Option<i64>,
    pub shift_id: Option<i64>,
    pub expected_periods: Vec<ExpectedPeriod>,
    pub check_in: Option<PrimitiveDateTime>,
    pub check_out: Option<PrimitiveDateTime>,
    pub status: Option<AttendanceStatus>,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub settings_version: i64,
}

impl DailyRecord {
    /// A record for a day with no expected work.
    #[must_use]
    pub const fn rest_day(
        employee_id: i64,
        work_date: Date,
        assignment_id: Option<i64>,
        shift_id: Option<i64>,
        settings_version: i64,
    ) -> Self {
        Self {
            employee_id,
            work_date,
            assignment_id,
            shift_id,
            expected_periods: Vec::new(),
            check_in: None,
            check_out: None,
            status: None,
            late_minutes: 0,
            early_leave_minutes: 0,
            settings_version,
        }
    }

    /// Returns whether the employee was expected to work.
    #[must_use]
    pub fn is_work_day(&self) -> bool {
        !self.expected_periods.is_empty()
    }
}
