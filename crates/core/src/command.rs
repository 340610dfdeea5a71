// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_domain::{AttendanceSettings, CorrectionRecord, ScheduleAssignment, Shift, TimePeriod};

/// A scheduling change for a single employee, expressed as data only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a new assignment, carving existing ones when `force` is set.
    CreateAssignment {
        /// The assignment to store.
        candidate: ScheduleAssignment,
        /// Whether intersecting assignments may be truncated, split or deleted.
        force: bool,
    },
    /// Remove one assignment.
    DeleteAssignment {
        /// The assignment to remove.
        assignment_id: i64,
    },
}

/// A change to shared catalog data or settings.
///
/// These commands are not scoped to an employee's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    /// Define a new time period.
    CreateTimePeriod {
        /// The period to validate and store.
        period: TimePeriod,
    },
    /// Supersede a time period and repoint the shifts that use it.
    ReplaceTimePeriod {
        /// The stored period being superseded.
        original: TimePeriod,
        /// The new definition.
        replacement: TimePeriod,
        /// Every shift currently referencing the original.
        shifts: Vec<Shift>,
    },
    /// Define a new shift.
    CreateShift {
        /// The shift to store.
        shift: Shift,
        /// The stored periods the shift may reference.
        known_periods: Vec<TimePeriod>,
    },
    /// Add a department.
    CreateDepartment {
        /// Department name.
        name: String,
        /// Parent department, if any.
        parent_id: Option<i64>,
    },
    /// Add an employee.
    CreateEmployee {
        /// Employee name.
        name: String,
        /// Owning department.
        department_id: i64,
        /// Whether the employee can be scheduled.
        active: bool,
    },
    /// Publish a new settings version.
    UpdateSettings {
        /// The version currently in force.
        current: AttendanceSettings,
        /// Requested values; the version field is ignored.
        requested: AttendanceSettings,
    },
    /// Record a clock correction for a work date.
    SubmitCorrection {
        /// The correction to store.
        correction: CorrectionRecord,
        /// Settings in force, used to place the clock time on a work date.
        settings: AttendanceSettings,
    },
}
