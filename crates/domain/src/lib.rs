// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod assignment;
mod attendance;
mod calculator;
mod clock;
mod date_range;
mod error;
mod organization;
mod settings;
mod shift;
mod time_period;
mod validation;

#[cfg(test)]
mod tests;

pub use assignment::{
    AssignmentMutation, ConflictDetail, ResolutionPlan, ScheduleAssignment, active_on,
    find_conflicts, plan_resolution, verify_non_overlapping,
};
pub use attendance::{
    AttendanceStatus, ClockRecord, ClockSource, ClockType, CorrectionRecord, DailyRecord,
    LeaveCategory, LeaveRecord,
};
pub use calculator::{DayInputs, calculate_daily_record, expected_periods};
pub use clock::{
    AbsoluteWindow, ClockWindow, SECONDS_PER_DAY, anchor_to_work_date, forward_seconds,
    work_date_of, work_day_bounds,
};
pub use date_range::DateRange;
pub use error::DomainError;
pub use organization::{
    BatchTargets, Department, Employee, expand_departments, select_batch_targets, validate_name,
};
pub use settings::AttendanceSettings;
pub use shift::{MAX_CYCLE_DAYS, Shift};
pub use time_period::{ExpectedPeriod, MAX_GRACE_MINUTES, PeriodKind, TimePeriod};
pub use validation::{
    format_clock_time, format_date, format_local_datetime, parse_clock_time, parse_date,
    parse_date_range, parse_local_datetime,
};
