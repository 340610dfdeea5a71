// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{CatalogCommand, Command};
use crate::error::CoreError;
use crate::state::{CatalogChange, CatalogResult, EmployeeSchedule, SchedulePlan, TransitionResult};
use clockwork_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clockwork_domain::{
    AssignmentMutation, AttendanceSettings, DomainError, ResolutionPlan, ScheduleAssignment,
    format_clock_time, format_date, format_local_datetime, plan_resolution, validate_name,
    verify_non_overlapping,
};
use std::collections::BTreeSet;

/// Applies a scheduling command to an employee's in-scope assignments.
///
/// Produces the new state, the storage plan and the audit event. Nothing is
/// written; the caller persists the plan atomically.
///
/// # Errors
///
/// Returns an error if:
/// - The command names a different employee than the state
/// - A non-forced candidate intersects existing assignments
/// - The assignment to delete is not in scope
/// - The resulting schedule would overlap
pub fn apply(
    state: &EmployeeSchedule,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::CreateAssignment { candidate, force } => {
            if candidate.employee_id() != state.employee_id {
                return Err(CoreError::ScopeMismatch {
                    expected_employee_id: state.employee_id,
                    actual_employee_id: candidate.employee_id(),
                });
            }

            let plan: ResolutionPlan = plan_resolution(&candidate, &state.assignments, force)?;

            let before: StateSnapshot = state.to_snapshot();
            let new_state: EmployeeSchedule = realize(state, &plan);
            verify_non_overlapping(&new_state.assignments)?;
            let after: StateSnapshot = new_state.to_snapshot();

            let name: &str = if plan.mutations.is_empty() {
                "CreateAssignment"
            } else {
                "ForceAssignment"
            };
            let mut details: String = format!(
                "Assigned shift {} to employee {} from {} to {}",
                candidate.shift_id(),
                candidate.employee_id(),
                format_date(candidate.start_date()),
                format_date(candidate.end_date())
            );
            for mutation in &plan.mutations {
                details.push_str(&format!(
                    "; {} assignment {}",
                    mutation.kind(),
                    mutation.original().assignment_id().unwrap_or_default()
                ));
            }

            let audit_event: AuditEvent = AuditEvent::new(
                Some(state.employee_id),
                actor,
                cause,
                Action::new(name.to_string(), Some(details)),
                before,
                after,
            );

            Ok(TransitionResult {
                new_state,
                plan: SchedulePlan::Create(plan),
                audit_event,
            })
        }
        Command::DeleteAssignment { assignment_id } => {
            let target: ScheduleAssignment = state
                .assignments
                .iter()
                .find(|a| a.assignment_id() == Some(assignment_id))
                .cloned()
                .ok_or(DomainError::AssignmentNotFound(assignment_id))?;

            let before: StateSnapshot = state.to_snapshot();
            let new_state: EmployeeSchedule = EmployeeSchedule::new(
                state.employee_id,
                state
                    .assignments
                    .iter()
                    .filter(|a| a.assignment_id() != Some(assignment_id))
                    .cloned()
                    .collect(),
            );
            let after: StateSnapshot = new_state.to_snapshot();

            let action: Action = Action::new(
                String::from("DeleteAssignment"),
                Some(format!(
                    "Deleted assignment {assignment_id} of employee {} ({} to {})",
                    state.employee_id,
                    format_date(target.start_date()),
                    format_date(target.end_date())
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                Some(state.employee_id),
                actor,
                cause,
                action,
                before,
                after,
            );

            Ok(TransitionResult {
                new_state,
                plan: SchedulePlan::Delete(target),
                audit_event,
            })
        }
    }
}

/// Computes the in-scope assignments once a plan is applied.
fn realize(state: &EmployeeSchedule, plan: &ResolutionPlan) -> EmployeeSchedule {
    let touched: BTreeSet<Option<i64>> = plan
        .mutations
        .iter()
        .map(|m| m.original().assignment_id())
        .collect();

    let mut assignments: Vec<ScheduleAssignment> = state
        .assignments
        .iter()
        .filter(|a| !touched.contains(&a.assignment_id()))
        .cloned()
        .collect();

    for mutation in &plan.mutations {
        match mutation {
            AssignmentMutation::Delete { .. } => {}
            AssignmentMutation::Truncate {
                original,
                remaining,
            } => assignments.push(original.with_range(*remaining)),
            AssignmentMutation::Split {
                original,
                left,
                right,
            } => {
                assignments.push(original.remainder(*left));
                assignments.push(original.remainder(*right));
            }
        }
    }
    assignments.push(plan.candidate.clone());

    EmployeeSchedule::new(state.employee_id, assignments)
}

/// Applies a catalog or settings command.
///
/// # Errors
///
/// Returns an error if the command violates a domain rule.
#[allow(clippy::too_many_lines)]
pub fn apply_catalog(
    command: CatalogCommand,
    actor: Actor,
    cause: Cause,
) -> Result<CatalogResult, CoreError> {
    match command {
        CatalogCommand::CreateTimePeriod { period } => {
            period.validate()?;

            let action: Action = Action::new(
                String::from("CreateTimePeriod"),
                Some(format!(
                    "Created {} period '{}' {}-{}",
                    period.kind(),
                    period.name(),
                    format_clock_time(period.start_time()),
                    format_clock_time(period.end_time())
                )),
            );
            let after: StateSnapshot = StateSnapshot::new(format!("time_period={}", period.name()));
            let audit_event: AuditEvent =
                AuditEvent::new(None, actor, cause, action, StateSnapshot::empty(), after);

            Ok(CatalogResult {
                change: CatalogChange::TimePeriod(period),
                audit_event,
            })
        }
        CatalogCommand::ReplaceTimePeriod {
            original,
            replacement,
            shifts,
        } => {
            let original_id: i64 = original
                .period_id()
                .ok_or_else(|| DomainError::InvalidTimePeriod {
                    reason: String::from("only stored periods can be replaced"),
                })?;
            if let Some(successor) = original.replaced_by() {
                return Err(CoreError::DomainViolation(DomainError::InvalidTimePeriod {
                    reason: format!(
                        "time period {original_id} was already replaced by {successor}"
                    ),
                }));
            }
            replacement.validate()?;

            let shift_ids: Vec<i64> = shifts
                .iter()
                .filter(|s| s.referenced_period_ids().contains(&original_id))
                .filter_map(clockwork_domain::Shift::shift_id)
                .collect();

            let action: Action = Action::new(
                String::from("ReplaceTimePeriod"),
                Some(format!(
                    "Replaced time period {original_id} and repointed {} shift(s)",
                    shift_ids.len()
                )),
            );
            let before: StateSnapshot = StateSnapshot::new(format!(
                "time_period={original_id},shifts={shift_ids:?}"
            ));
            let after: StateSnapshot =
                StateSnapshot::new(format!("time_period={},replaces={original_id}", replacement.name()));
            let audit_event: AuditEvent = AuditEvent::new(None, actor, cause, action, before, after);

            Ok(CatalogResult {
                change: CatalogChange::Replacement {
                    original_id,
                    replacement,
                    shift_ids,
                },
                audit_event,
            })
        }
        CatalogCommand::CreateShift {
            shift,
            known_periods,
        } => {
            let known: BTreeSet<i64> = known_periods
                .iter()
                .filter_map(clockwork_domain::TimePeriod::period_id)
                .collect();
            if let Some(missing) = shift
                .referenced_period_ids()
                .into_iter()
                .find(|id| !known.contains(id))
            {
                return Err(CoreError::DomainViolation(DomainError::TimePeriodNotFound(
                    missing,
                )));
            }
            if let Some(retired) = known_periods
                .iter()
                .filter(|p| p.replaced_by().is_some())
                .filter_map(clockwork_domain::TimePeriod::period_id)
                .find(|id| shift.referenced_period_ids().contains(id))
            {
                return Err(CoreError::DomainViolation(DomainError::InvalidShift {
                    reason: format!("time period {retired} has been replaced"),
                }));
            }

            let working_days: usize = shift.days().iter().filter(|d| !d.is_empty()).count();
            let action: Action = Action::new(
                String::from("CreateShift"),
                Some(format!(
                    "Created shift '{}' with a {}-day cycle ({working_days} working)",
                    shift.name(),
                    shift.cycle_days()
                )),
            );
            let after: StateSnapshot = StateSnapshot::new(format!("shift={}", shift.name()));
            let audit_event: AuditEvent =
                AuditEvent::new(None, actor, cause, action, StateSnapshot::empty(), after);

            Ok(CatalogResult {
                change: CatalogChange::Shift(shift),
                audit_event,
            })
        }
        CatalogCommand::CreateDepartment { name, parent_id } => {
            validate_name("Department", &name)?;
            let name: String = name.trim().to_string();

            let action: Action = Action::new(
                String::from("CreateDepartment"),
                Some(format!("Created department '{name}'")),
            );
            let after: StateSnapshot =
                StateSnapshot::new(format!("department={name},parent={parent_id:?}"));
            let audit_event: AuditEvent =
                AuditEvent::new(None, actor, cause, action, StateSnapshot::empty(), after);

            Ok(CatalogResult {
                change: CatalogChange::Department { name, parent_id },
                audit_event,
            })
        }
        CatalogCommand::CreateEmployee {
            name,
            department_id,
            active,
        } => {
            validate_name("Employee", &name)?;
            let name: String = name.trim().to_string();

            let action: Action = Action::new(
                String::from("CreateEmployee"),
                Some(format!(
                    "Created employee '{name}' in department {department_id}"
                )),
            );
            let after: StateSnapshot = StateSnapshot::new(format!(
                "employee={name},department={department_id},active={active}"
            ));
            let audit_event: AuditEvent =
                AuditEvent::new(None, actor, cause, action, StateSnapshot::empty(), after);

            Ok(CatalogResult {
                change: CatalogChange::Employee {
                    name,
                    department_id,
                    active,
                },
                audit_event,
            })
        }
        CatalogCommand::UpdateSettings { current, requested } => {
            let next: AttendanceSettings = AttendanceSettings {
                version: current.version + 1,
                ..requested
            };
            next.validate()?;

            let describe = |s: &AttendanceSettings| {
                format!(
                    "version={},day_switch={},auto_calc={},timezone={}",
                    s.version,
                    format_clock_time(s.day_switch_time),
                    format_clock_time(s.auto_calc_time),
                    s.timezone
                )
            };
            let action: Action = Action::new(
                String::from("UpdateSettings"),
                Some(format!("Published settings version {}", next.version)),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                None,
                actor,
                cause,
                action,
                StateSnapshot::new(describe(&current)),
                StateSnapshot::new(describe(&next)),
            );

            Ok(CatalogResult {
                change: CatalogChange::Settings(next),
                audit_event,
            })
        }
        CatalogCommand::SubmitCorrection {
            correction,
            settings,
        } => {
            correction.validate(settings.day_switch_time)?;

            let action: Action = Action::new(
                String::from("SubmitCorrection"),
                Some(format!(
                    "Corrected {} for {} at {}: {}",
                    correction.clock_type.as_str(),
                    format_date(correction.work_date),
                    format_local_datetime(correction.clock_time),
                    correction.reason.trim()
                )),
            );
            let after: StateSnapshot = StateSnapshot::new(format!(
                "work_date={},type={},approved={}",
                format_date(correction.work_date),
                correction.clock_type.as_str(),
                correction.approved
            ));
            let audit_event: AuditEvent = AuditEvent::new(
                Some(correction.employee_id),
                actor,
                cause,
                action,
                StateSnapshot::empty(),
                after,
            );

            Ok(CatalogResult {
                change: CatalogChange::Correction(correction),
                audit_event,
            })
        }
    }
}
