// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates travel as `YYYY-MM-DD`, clock-of-day values as `HH:MM[:SS]` and local
//! date-times as `YYYY-MM-DDTHH:MM:SS`.

use clockwork_audit::AuditEvent;
use clockwork_domain::{
    AssignmentMutation, AttendanceSettings, ClockRecord, CorrectionRecord, DailyRecord, Department,
    Employee, ExpectedPeriod, LeaveRecord, ScheduleAssignment, Shift, TimePeriod,
    format_clock_time, format_date, format_local_datetime,
};
use clockwork_persistence::StoredDailyRecord;
use serde::{Deserialize, Serialize};

// ============================================================================
// Schedules
// ============================================================================

/// API request to schedule one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub employee_id: i64,
    pub shift_id: i64,
    pub start_date: String,
    pub end_date: String,
    /// Truncate, split or delete intersecting assignments instead of failing.
    #[serde(default)]
    pub force: bool,
}

/// A stored schedule assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    pub assignment_id: i64,
    pub employee_id: i64,
    pub shift_id: i64,
    pub start_date: String,
    pub end_date: String,
    /// Date on which cycle position 1 falls.
    pub cycle_anchor: String,
    pub created_at: Option<String>,
}

impl AssignmentInfo {
    #[must_use]
    pub fn from_assignment(assignment: &ScheduleAssignment) -> Self {
        Self {
            assignment_id: assignment.assignment_id().unwrap_or_default(),
            employee_id: assignment.employee_id(),
            shift_id: assignment.shift_id(),
            start_date: format_date(assignment.start_date()),
            end_date: format_date(assignment.end_date()),
            cycle_anchor: format_date(assignment.cycle_anchor()),
            created_at: assignment.created_at().map(str::to_string),
        }
    }
}

/// An inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeInfo {
    pub start_date: String,
    pub end_date: String,
}

/// A change made to an existing assignment to admit a forced candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationInfo {
    /// `delete`, `truncate` or `split`.
    pub kind: String,
    pub assignment_id: i64,
    pub original: DateRangeInfo,
    /// What survives of the original. Empty for deletions.
    pub remaining: Vec<DateRangeInfo>,
}

impl MutationInfo {
    #[must_use]
    pub fn from_mutation(mutation: &AssignmentMutation) -> Self {
        let original: &ScheduleAssignment = mutation.original();
        let remaining: Vec<DateRangeInfo> = match mutation {
            AssignmentMutation::Delete { .. } => Vec::new(),
            AssignmentMutation::Truncate { remaining, .. } => vec![DateRangeInfo {
                start_date: format_date(remaining.start()),
                end_date: format_date(remaining.end()),
            }],
            AssignmentMutation::Split { left, right, .. } => [left, right]
                .iter()
                .map(|r| DateRangeInfo {
                    start_date: format_date(r.start()),
                    end_date: format_date(r.end()),
                })
                .collect(),
        };
        Self {
            kind: mutation.kind().to_string(),
            assignment_id: original.assignment_id().unwrap_or_default(),
            original: DateRangeInfo {
                start_date: format_date(original.start_date()),
                end_date: format_date(original.end_date()),
            },
            remaining,
        }
    }
}

/// API response for a successful scheduling call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssignmentResponse {
    pub assignment: AssignmentInfo,
    pub mutations: Vec<MutationInfo>,
    /// Remainder assignments created by splits.
    pub created_remainders: Vec<AssignmentInfo>,
    /// The event ID of the persisted audit event.
    pub event_id: i64,
}

/// One intersecting assignment reported by a schedule conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub assignment_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub overlap_start: String,
    pub overlap_end: String,
}

/// API request to schedule every employee of one or more departments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCreateRequest {
    pub department_ids: Vec<i64>,
    pub shift_id: i64,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub include_sub_departments: bool,
}

/// An employee the batch could not schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub employee_id: i64,
    pub reason: String,
}

/// API response for a batch scheduling call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    /// Employees scheduled successfully.
    pub count: usize,
    pub failures: Vec<BatchFailure>,
}

/// Query for assignments intersecting a range.
///
/// Exactly one of `employee_id` and `department_id` must be given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSchedulesQuery {
    pub employee_id: Option<i64>,
    pub department_id: Option<i64>,
    #[serde(default)]
    pub include_sub_departments: bool,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSchedulesResponse {
    pub assignments: Vec<AssignmentInfo>,
}

/// Query for the per-day expansion of one employee's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub employee_id: i64,
    pub start_date: String,
    pub end_date: String,
}

/// A time period resolved to local instants for one work date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedPeriodInfo {
    pub period_id: i64,
    pub name: String,
    pub kind: String,
    pub start: String,
    pub end: String,
    pub check_in_start: String,
    pub check_in_end: String,
    pub check_out_start: String,
    pub check_out_end: String,
    pub rest_start: Option<String>,
    pub rest_end: Option<String>,
    pub late_grace_minutes: u32,
    pub early_leave_grace_minutes: u32,
}

impl ExpectedPeriodInfo {
    #[must_use]
    pub fn from_period(period: &ExpectedPeriod) -> Self {
        Self {
            period_id: period.period_id,
            name: period.name.clone(),
            kind: period.kind.as_str().to_string(),
            start: format_local_datetime(period.start),
            end: format_local_datetime(period.end),
            check_in_start: format_local_datetime(period.check_in.start),
            check_in_end: format_local_datetime(period.check_in.end),
            check_out_start: format_local_datetime(period.check_out.start),
            check_out_end: format_local_datetime(period.check_out.end),
            rest_start: period.rest.map(|r| format_local_datetime(r.start)),
            rest_end: period.rest.map(|r| format_local_datetime(r.end)),
            late_grace_minutes: period.late_grace_minutes,
            early_leave_grace_minutes: period.early_leave_grace_minutes,
        }
    }
}

/// One day of an employee's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDayInfo {
    pub date: String,
    pub assignment_id: Option<i64>,
    pub shift_id: Option<i64>,
    pub day_of_cycle: Option<u16>,
    /// Empty on rest days and unassigned days.
    pub periods: Vec<ExpectedPeriodInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub employee_id: i64,
    pub days: Vec<CalendarDayInfo>,
}

// ============================================================================
// Attendance
// ============================================================================

/// API request to recalculate daily records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculateRequest {
    pub start_date: String,
    pub end_date: String,
    /// All active employees when omitted.
    pub employee_ids: Option<Vec<i64>>,
}

/// API response for an accepted recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculateAccepted {
    pub job_id: u64,
    pub total_cells: usize,
}

/// A cell a recalculation could not compute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFailure {
    pub employee_id: i64,
    pub work_date: String,
    pub reason: String,
}

/// Lifecycle of a recalculation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed,
    Cancelled,
}

/// Progress report of a recalculation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcJobInfo {
    pub job_id: u64,
    pub state: JobState,
    pub start_date: String,
    pub end_date: String,
    /// The settings version every cell of this job is computed with.
    pub settings_version: i64,
    pub total_cells: usize,
    pub completed_cells: usize,
    /// Cells never started because the job was cancelled.
    pub skipped_cells: usize,
    pub failures: Vec<CellFailure>,
}

/// Query for stored daily records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecordsQuery {
    pub employee_id: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// A stored daily record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecordInfo {
    pub record_id: i64,
    pub employee_id: i64,
    pub work_date: String,
    pub assignment_id: Option<i64>,
    pub shift_id: Option<i64>,
    pub expected_periods: Vec<ExpectedPeriodInfo>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    /// Absent on rest days.
    pub status: Option<String>,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub settings_version: i64,
    pub calculated_at: Option<String>,
}

impl DailyRecordInfo {
    #[must_use]
    pub fn from_record(record_id: i64, record: &DailyRecord, calculated_at: Option<String>) -> Self {
        Self {
            record_id,
            employee_id: record.employee_id,
            work_date: format_date(record.work_date),
            assignment_id: record.assignment_id,
            shift_id: record.shift_id,
            expected_periods: record
                .expected_periods
                .iter()
                .map(ExpectedPeriodInfo::from_period)
                .collect(),
            check_in: record.check_in.map(format_local_datetime),
            check_out: record.check_out.map(format_local_datetime),
            status: record.status.map(|s| s.as_str().to_string()),
            late_minutes: record.late_minutes,
            early_leave_minutes: record.early_leave_minutes,
            settings_version: record.settings_version,
            calculated_at,
        }
    }

    #[must_use]
    pub fn from_stored(stored: &StoredDailyRecord) -> Self {
        Self::from_record(stored.record_id, &stored.record, stored.calculated_at.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecordPageResponse {
    pub records: Vec<DailyRecordInfo>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

/// API request to append a clock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRecordRequest {
    pub employee_id: i64,
    pub clock_time: String,
    /// `sign_in` or `sign_out`.
    pub clock_type: String,
    /// `device` or `manual`. Defaults to `device`.
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRecordInfo {
    pub record_id: i64,
    pub employee_id: i64,
    pub clock_time: String,
    pub clock_type: String,
    pub source: String,
}

impl ClockRecordInfo {
    #[must_use]
    pub fn from_record(record: &ClockRecord) -> Self {
        Self {
            record_id: record.record_id,
            employee_id: record.employee_id,
            clock_time: format_local_datetime(record.clock_time),
            clock_type: record.clock_type.as_str().to_string(),
            source: record.source.as_str().to_string(),
        }
    }
}

/// API request to record leave or a business trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub employee_id: i64,
    pub category: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInfo {
    pub leave_id: i64,
    pub employee_id: i64,
    pub category: String,
    pub start: String,
    pub end: String,
    pub approved: bool,
}

impl LeaveInfo {
    #[must_use]
    pub fn from_record(leave: &LeaveRecord) -> Self {
        Self {
            leave_id: leave.leave_id,
            employee_id: leave.employee_id,
            category: leave.category.as_str().to_string(),
            start: format_local_datetime(leave.start),
            end: format_local_datetime(leave.end),
            approved: leave.approved,
        }
    }
}

/// API request to supplement a missing or wrong clock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub employee_id: i64,
    pub work_date: String,
    pub clock_type: String,
    pub clock_time: String,
    pub reason: String,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionInfo {
    pub correction_id: i64,
    pub employee_id: i64,
    pub work_date: String,
    pub clock_type: String,
    pub clock_time: String,
    pub reason: String,
    pub approved: bool,
    pub clock_record_id: Option<i64>,
}

impl CorrectionInfo {
    #[must_use]
    pub fn from_record(correction: &CorrectionRecord) -> Self {
        Self {
            correction_id: correction.correction_id,
            employee_id: correction.employee_id,
            work_date: format_date(correction.work_date),
            clock_type: correction.clock_type.as_str().to_string(),
            clock_time: format_local_datetime(correction.clock_time),
            reason: correction.reason.clone(),
            approved: correction.approved,
            clock_record_id: correction.clock_record_id,
        }
    }
}

/// API response for a stored correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResponse {
    pub correction: CorrectionInfo,
    pub event_id: i64,
    /// The recalculated day, present when the correction was approved.
    pub daily_record: Option<DailyRecordInfo>,
}

// ============================================================================
// Catalog
// ============================================================================

/// API request to define a time period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriodRequest {
    pub name: String,
    /// `fixed` or `flexible`.
    pub kind: String,
    pub start_time: String,
    pub end_time: String,
    pub rest_start: Option<String>,
    pub rest_end: Option<String>,
    pub check_in_start: String,
    pub check_in_end: String,
    pub check_out_start: String,
    pub check_out_end: String,
    pub late_grace_minutes: u32,
    pub early_leave_grace_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriodInfo {
    pub period_id: i64,
    pub name: String,
    pub kind: String,
    pub start_time: String,
    pub end_time: String,
    pub rest_start: Option<String>,
    pub rest_end: Option<String>,
    pub check_in_start: String,
    pub check_in_end: String,
    pub check_out_start: String,
    pub check_out_end: String,
    pub late_grace_minutes: u32,
    pub early_leave_grace_minutes: u32,
    pub replaced_by: Option<i64>,
}

impl TimePeriodInfo {
    #[must_use]
    pub fn from_period(period: &TimePeriod) -> Self {
        Self {
            period_id: period.period_id().unwrap_or_default(),
            name: period.name().to_string(),
            kind: period.kind().as_str().to_string(),
            start_time: format_clock_time(period.start_time()),
            end_time: format_clock_time(period.end_time()),
            rest_start: period.rest().map(|r| format_clock_time(r.start())),
            rest_end: period.rest().map(|r| format_clock_time(r.end())),
            check_in_start: format_clock_time(period.check_in_window().start()),
            check_in_end: format_clock_time(period.check_in_window().end()),
            check_out_start: format_clock_time(period.check_out_window().start()),
            check_out_end: format_clock_time(period.check_out_window().end()),
            late_grace_minutes: period.late_grace_minutes(),
            early_leave_grace_minutes: period.early_leave_grace_minutes(),
            replaced_by: period.replaced_by(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTimePeriodResponse {
    pub time_period: TimePeriodInfo,
    pub event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceTimePeriodResponse {
    pub replaced_period_id: i64,
    pub replacement: TimePeriodInfo,
    /// Shift cycle positions now pointing at the replacement.
    pub repointed_positions: usize,
    pub event_id: i64,
}

/// The periods worked on one cycle position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDayInfo {
    pub day_of_cycle: u16,
    pub period_ids: Vec<i64>,
}

/// API request to define a shift. Positions not listed are rest days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    pub name: String,
    pub cycle_days: u16,
    pub days: Vec<ShiftDayInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInfo {
    pub shift_id: i64,
    pub name: String,
    pub cycle_days: u16,
    /// Every cycle position in order, rest days included.
    pub days: Vec<ShiftDayInfo>,
}

impl ShiftInfo {
    #[must_use]
    pub fn from_shift(shift: &Shift) -> Self {
        Self {
            shift_id: shift.shift_id().unwrap_or_default(),
            name: shift.name().to_string(),
            cycle_days: shift.cycle_days(),
            days: (1..=shift.cycle_days())
                .zip(shift.days())
                .map(|(day_of_cycle, period_ids)| ShiftDayInfo {
                    day_of_cycle,
                    period_ids: period_ids.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShiftResponse {
    pub shift: ShiftInfo,
    pub event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInfo {
    pub department_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl DepartmentInfo {
    #[must_use]
    pub fn from_department(department: &Department) -> Self {
        Self {
            department_id: department.department_id,
            name: department.name.clone(),
            parent_id: department.parent_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDepartmentResponse {
    pub department: DepartmentInfo,
    pub event_id: i64,
}

const fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub department_id: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInfo {
    pub employee_id: i64,
    pub name: String,
    pub department_id: i64,
    pub active: bool,
}

impl EmployeeInfo {
    #[must_use]
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            employee_id: employee.employee_id,
            name: employee.name.clone(),
            department_id: employee.department_id,
            active: employee.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmployeeResponse {
    pub employee: EmployeeInfo,
    pub event_id: i64,
}

// ============================================================================
// Settings and audit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsInfo {
    pub version: i64,
    pub day_switch_time: String,
    pub auto_calc_time: String,
    pub timezone: String,
}

impl SettingsInfo {
    #[must_use]
    pub fn from_settings(settings: &AttendanceSettings) -> Self {
        Self {
            version: settings.version,
            day_switch_time: format_clock_time(settings.day_switch_time),
            auto_calc_time: format_clock_time(settings.auto_calc_time),
            timezone: settings.timezone.clone(),
        }
    }
}

/// API request to publish a new settings version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub day_switch_time: String,
    pub auto_calc_time: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettingsResponse {
    pub settings: SettingsInfo,
    pub event_id: i64,
}

/// Serializable representation of an `AuditEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    pub event_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub before_snapshot: String,
    pub after_snapshot: String,
    pub created_at: Option<String>,
}

impl AuditEventInfo {
    #[must_use]
    pub fn from_event(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            employee_id: event.employee_id,
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            action_name: event.action.name.clone(),
            action_details: event.action.details.clone(),
            before_snapshot: event.before.data.clone(),
            after_snapshot: event.after.data.clone(),
            created_at: event.created_at.clone(),
        }
    }
}
