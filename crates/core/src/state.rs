// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_audit::{AuditEvent, StateSnapshot};
use clockwork_domain::{
    AttendanceSettings, CorrectionRecord, ResolutionPlan, ScheduleAssignment, Shift, TimePeriod,
    format_date,
};

/// The assignments of one employee that a command can touch.
///
/// For a create this is every assignment intersecting the candidate range;
/// for a delete it must contain the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeSchedule {
    /// The employee this state is scoped to.
    pub employee_id: i64,
    /// Assignments in scope.
    pub assignments: Vec<ScheduleAssignment>,
}

impl EmployeeSchedule {
    /// Creates the scoped state for an employee.
    #[must_use]
    pub const fn new(employee_id: i64, assignments: Vec<ScheduleAssignment>) -> Self {
        Self {
            employee_id,
            assignments,
        }
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let mut sorted: Vec<&ScheduleAssignment> = self.assignments.iter().collect();
        sorted.sort_by_key(|a| a.start_date());
        let entries: Vec<String> = sorted
            .iter()
            .map(|a| {
                let id: String = a
                    .assignment_id()
                    .map_or_else(|| String::from("new"), |id| id.to_string());
                format!(
                    "#{id} shift {} {}..{}",
                    a.shift_id(),
                    format_date(a.start_date()),
                    format_date(a.end_date())
                )
            })
            .collect();
        StateSnapshot::new(format!(
            "employee_id={},assignments=[{}]",
            self.employee_id,
            entries.join("; ")
        ))
    }
}

/// What storage must do to realize a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulePlan {
    /// Insert the candidate and apply the mutations.
    Create(ResolutionPlan),
    /// Remove the assignment.
    Delete(ScheduleAssignment),
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The employee's in-scope assignments after the transition.
    pub new_state: EmployeeSchedule,
    /// The storage work the transition requires.
    pub plan: SchedulePlan,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// A validated catalog or settings change ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    TimePeriod(TimePeriod),
    Replacement {
        /// Id of the superseded period.
        original_id: i64,
        /// The new period, unpersisted.
        replacement: TimePeriod,
        /// Ids of the shifts to repoint.
        shift_ids: Vec<i64>,
    },
    Shift(Shift),
    Department {
        name: String,
        parent_id: Option<i64>,
    },
    Employee {
        name: String,
        department_id: i64,
        active: bool,
    },
    Settings(AttendanceSettings),
    Correction(CorrectionRecord),
}

/// The result of a catalog operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResult {
    /// The change to persist.
    pub change: CatalogChange,
    /// The audit event recording this operation.
    pub audit_event: AuditEvent,
}
