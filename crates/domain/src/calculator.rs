// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Daily attendance calculation.
//!
//! This module is pure: given the schedule, the day's clock events, approved
//! leave and a settings snapshot, it produces the same `DailyRecord` every time.
//!
//! Precedence, highest first:
//!
//! 1. approved leave overlapping any expected period
//! 2. no expected periods, a rest day with no status
//! 3. a period without a qualifying sign-in, absent
//! 4. late and early leave, late winning when both apply
//! 5. normal

use crate::assignment::ScheduleAssignment;
use crate::attendance::{
    AttendanceStatus, ClockRecord, ClockSource, ClockType, DailyRecord, LeaveCategory, LeaveRecord,
};
use crate::clock::AbsoluteWindow;
use crate::error::DomainError;
use crate::settings::AttendanceSettings;
use crate::shift::Shift;
use crate::time_period::{ExpectedPeriod, PeriodKind, TimePeriod};
use time::{Date, PrimitiveDateTime};

/// Everything the calculator reads for one employee and work date.
#[derive(Debug, Clone, Copy)]
pub struct DayInputs<'a> {
    pub employee_id: i64,
    pub work_date: Date,
    /// The assignment covering the work date, if any.
    pub assignment: Option<&'a ScheduleAssignment>,
    /// The assignment's shift.
    pub shift: Option<&'a Shift>,
    /// Every period the shift may reference.
    pub periods: &'a [TimePeriod],
    pub clocks: &'a [ClockRecord],
    /// Leave records; unapproved entries are ignored.
    pub leaves: &'a [LeaveRecord],
    pub settings: &'a AttendanceSettings,
}

/// Result of evaluating one expected period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeriodOutcome {
    check_in: Option<PrimitiveDateTime>,
    check_out: Option<PrimitiveDateTime>,
    late_minutes: i64,
    early_leave_minutes: i64,
}

/// Resolves the expected periods of a work date.
///
/// Returns an empty list on a rest day.
///
/// # Errors
///
/// Returns an error when the assignment and shift disagree or a referenced
/// period is missing.
pub fn expected_periods(
    assignment: &ScheduleAssignment,
    shift: &Shift,
    periods: &[TimePeriod],
    work_date: Date,
    settings: &AttendanceSettings,
) -> Result<Vec<ExpectedPeriod>, DomainError> {
    let shift_id: i64 = shift.shift_id().unwrap_or_default();
    if assignment.shift_id() != shift_id {
        return Err(DomainError::ShiftMismatch {
            expected: assignment.shift_id(),
            actual: shift_id,
        });
    }

    let position: u16 = shift.day_of_cycle(assignment.cycle_anchor(), work_date);
    let mut resolved: Vec<ExpectedPeriod> = Vec::new();
    for period_id in shift.periods_on(position)? {
        let period: &TimePeriod = periods
            .iter()
            .find(|p| p.period_id() == Some(*period_id))
            .ok_or(DomainError::TimePeriodNotFound(*period_id))?;
        resolved.push(period.resolve(work_date, settings.day_switch_time)?);
    }
    resolved.sort_by_key(|p| (p.start, p.period_id));
    Ok(resolved)
}

/// Computes the daily record for one employee and work date.
///
/// # Errors
///
/// Returns an error when the schedule references missing data or dates overflow.
pub fn calculate_daily_record(inputs: &DayInputs<'_>) -> Result<DailyRecord, DomainError> {
    let (Some(assignment), Some(shift)) = (inputs.assignment, inputs.shift) else {
        return Ok(DailyRecord::rest_day(
            inputs.employee_id,
            inputs.work_date,
            None,
            None,
            inputs.settings.version,
        ));
    };

    let expected: Vec<ExpectedPeriod> = expected_periods(
        assignment,
        shift,
        inputs.periods,
        inputs.work_date,
        inputs.settings,
    )?;

    if expected.is_empty() {
        return Ok(DailyRecord::rest_day(
            inputs.employee_id,
            inputs.work_date,
            assignment.assignment_id(),
            shift.shift_id(),
            inputs.settings.version,
        ));
    }

    let clocks: Vec<&ClockRecord> = effective_clocks(inputs.clocks, &expected);
    let outcomes: Vec<PeriodOutcome> = expected
        .iter()
        .map(|period| evaluate_period(period, &clocks))
        .collect();

    let check_in: Option<PrimitiveDateTime> = outcomes.iter().find_map(|o| o.check_in);
    let check_out: Option<PrimitiveDateTime> = outcomes.iter().rev().find_map(|o| o.check_out);

    let mut record = DailyRecord {
        employee_id: inputs.employee_id,
        work_date: inputs.work_date,
        assignment_id: assignment.assignment_id(),
        shift_id: shift.shift_id(),
        expected_periods: expected,
        check_in,
        check_out,
        status: None,
        late_minutes: 0,
        early_leave_minutes: 0,
        settings_version: inputs.settings.version,
    };

    if let Some(category) = overlapping_leave(inputs.leaves, &record.expected_periods) {
        record.status = Some(match category {
            LeaveCategory::BusinessTrip => AttendanceStatus::BusinessTrip,
            _ => AttendanceStatus::Leave,
        });
        return Ok(record);
    }

    if outcomes.iter().any(|o| o.check_in.is_none()) {
        record.status = Some(AttendanceStatus::Absent);
        return Ok(record);
    }

    record.late_minutes = outcomes.iter().map(|o| o.late_minutes).sum();
    record.early_leave_minutes = outcomes.iter().map(|o| o.early_leave_minutes).sum();
    record.status = Some(if record.late_minutes > 0 {
        AttendanceStatus::Late
    } else if record.early_leave_minutes > 0 {
        AttendanceStatus::EarlyLeave
    } else {
        AttendanceStatus::Normal
    });

    Ok(record)
}

/// The span over which a day's clock events are considered.
fn day_span(expected: &[ExpectedPeriod]) -> Option<AbsoluteWindow> {
    let start: PrimitiveDateTime = expected.iter().map(|p| p.evaluation_window().start).min()?;
    let end: PrimitiveDateTime = expected.iter().map(|p| p.evaluation_window().end).max()?;
    Some(AbsoluteWindow { start, end })
}

/// Drops device and manual events of a type for which a correction exists.
fn effective_clocks<'a>(
    clocks: &'a [ClockRecord],
    expected: &[ExpectedPeriod],
) -> Vec<&'a ClockRecord> {
    let Some(span) = day_span(expected) else {
        return Vec::new();
    };

    let in_span: Vec<&ClockRecord> = clocks
        .iter()
        .filter(|c| span.contains(c.clock_time))
        .collect();

    let corrected = |clock_type: ClockType| {
        in_span
            .iter()
            .any(|c| c.clock_type == clock_type && c.source == ClockSource::Correction)
    };
    let sign_in_corrected: bool = corrected(ClockType::SignIn);
    let sign_out_corrected: bool = corrected(ClockType::SignOut);

    in_span
        .into_iter()
        .filter(|c| {
            let overridden: bool = match c.clock_type {
                ClockType::SignIn => sign_in_corrected,
                ClockType::SignOut => sign_out_corrected,
            };
            !overridden || c.source == ClockSource::Correction
        })
        .collect()
}

fn evaluate_period(period: &ExpectedPeriod, clocks: &[&ClockRecord]) -> PeriodOutcome {
    let window_close: PrimitiveDateTime = period.evaluation_window().end;

    let check_in: Option<PrimitiveDateTime> = clocks
        .iter()
        .filter(|c| c.clock_type == ClockType::SignIn)
        .map(|c| c.clock_time)
        .filter(|t| period.check_in.start <= *t && *t <= window_close)
        .min();

    let Some(check_in) = check_in else {
        return PeriodOutcome {
            check_in: None,
            check_out: None,
            late_minutes: 0,
            early_leave_minutes: 0,
        };
    };

    let check_out: Option<PrimitiveDateTime> = clocks
        .iter()
        .filter(|c| c.clock_type == ClockType::SignOut)
        .map(|c| c.clock_time)
        .filter(|t| check_in < *t && *t <= window_close)
        .max();

    let (late_reference, leave_reference) = match period.kind {
        PeriodKind::Fixed => (period.start, period.end),
        PeriodKind::Flexible => (period.check_in.end, check_in + period.duration()),
    };

    let late: i64 = (check_in - late_reference).whole_minutes();
    let late_minutes: i64 = if late > i64::from(period.late_grace_minutes) {
        late
    } else {
        0
    };

    // A missing sign-out counts as leaving at the moment of arrival.
    let departed: PrimitiveDateTime = check_out.unwrap_or(check_in);
    let early: i64 = (leave_reference - departed).whole_minutes();
    let early_leave_minutes: i64 = if early > i64::from(period.early_leave_grace_minutes) {
        early
    } else {
        0
    };

    PeriodOutcome {
        check_in: Some(check_in),
        check_out,
        late_minutes,
        early_leave_minutes,
    }
}

/// Category of the first approved leave overlapping any expected period.
fn overlapping_leave(leaves: &[LeaveRecord], expected: &[ExpectedPeriod]) -> Option<LeaveCategory> {
    let mut overlapping: Vec<&LeaveRecord> = leaves
        .iter()
        .filter(|l| l.approved)
        .filter(|l| {
            expected
                .iter()
                .any(|p| l.start < p.end && p.start < l.end)
        })
        .collect();
    overlapping.sort_by_key(|l| (l.start, l.leave_id));
    overlapping.first().map(|l| l.category)
}
