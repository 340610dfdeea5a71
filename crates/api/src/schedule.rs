// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conflict-resolving scheduling, batch fan-out and schedule queries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use clockwork::{Command, EmployeeSchedule, SchedulePlan, TransitionResult, apply};
use clockwork_audit::{Actor, Cause};
use clockwork_domain::{
    BatchTargets, DateRange, Department, DomainError, Employee, ExpectedPeriod,
    ScheduleAssignment, Shift, TimePeriod, active_on, expand_departments, expected_periods,
    format_date, parse_date_range, select_batch_targets,
};
use clockwork_persistence::{PersistTransitionResult, Persistence};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::engine::Engine;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AssignmentInfo, BatchCreateRequest, BatchCreateResponse, BatchFailure, CalendarDayInfo,
    CalendarQuery, CalendarResponse, CreateAssignmentRequest, CreateAssignmentResponse,
    ExpectedPeriodInfo, ListSchedulesQuery, ListSchedulesResponse, MutationInfo,
};

/// Longest range a calendar query may expand.
pub const MAX_CALENDAR_DAYS: i64 = 366;

/// Parses an inclusive `YYYY-MM-DD` range.
pub(crate) fn parse_range(start: &str, end: &str) -> Result<DateRange, ApiError> {
    parse_date_range(start, end).map_err(translate_domain_error)
}

pub(crate) fn require_employee(
    persistence: &mut Persistence,
    employee_id: i64,
) -> Result<Employee, ApiError> {
    persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::EmployeeNotFound(employee_id)))
}

pub(crate) fn require_shift(persistence: &mut Persistence, shift_id: i64) -> Result<Shift, ApiError> {
    persistence
        .get_shift(shift_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::ShiftNotFound(shift_id)))
}

fn require_departments(
    persistence: &mut Persistence,
    department_ids: &[i64],
) -> Result<Vec<Department>, ApiError> {
    let departments: Vec<Department> = persistence
        .list_departments()
        .map_err(translate_persistence_error)?;
    if let Some(missing) = department_ids
        .iter()
        .find(|id| !departments.iter().any(|d| d.department_id == **id))
    {
        return Err(translate_domain_error(DomainError::DepartmentNotFound(
            *missing,
        )));
    }
    Ok(departments)
}

impl Engine {
    /// Schedules one employee, resolving conflicts with existing assignments.
    ///
    /// Without `force`, any intersecting assignment rejects the request and
    /// nothing is written. With `force`, intersecting assignments are deleted,
    /// truncated or split in the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The date range is malformed or inverted
    /// - The employee or shift does not exist
    /// - The employee is inactive
    /// - A non-forced request intersects existing assignments
    pub async fn create_assignment(
        &self,
        request: &CreateAssignmentRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<CreateAssignmentResponse, ApiError> {
        let range: DateRange = parse_range(&request.start_date, &request.end_date)?;
        let employee_id: i64 = request.employee_id;
        let shift_id: i64 = request.shift_id;

        self.with_persistence("validate_assignment", |p| {
            let employee: Employee = require_employee(p, employee_id)?;
            if !employee.active {
                return Err(translate_domain_error(DomainError::EmployeeInactive(
                    employee_id,
                )));
            }
            require_shift(p, shift_id).map(|_| ())
        })
        .await?;

        self.schedule_employee(employee_id, shift_id, range, request.force, actor, cause)
            .await
    }

    /// Resolves and stores one candidate while holding the employee's lock.
    ///
    /// The lock spans the intersect query through the commit, so two requests
    /// for the same employee never plan against the same snapshot.
    pub(crate) async fn schedule_employee(
        &self,
        employee_id: i64,
        shift_id: i64,
        range: DateRange,
        force: bool,
        actor: Actor,
        cause: Cause,
    ) -> Result<CreateAssignmentResponse, ApiError> {
        let _guard = self.employee_locks.lock(employee_id).await;

        let response: CreateAssignmentResponse = self
            .with_persistence("create_assignment", |p| {
                let existing: Vec<ScheduleAssignment> = p
                    .list_assignments_for_employee(employee_id, range)
                    .map_err(translate_persistence_error)?;
                let state: EmployeeSchedule = EmployeeSchedule::new(employee_id, existing);
                let command: Command = Command::CreateAssignment {
                    candidate: ScheduleAssignment::new(employee_id, shift_id, range),
                    force,
                };
                let result: TransitionResult =
                    apply(&state, command, actor.clone(), cause.clone())
                        .map_err(translate_core_error)?;
                let persisted: PersistTransitionResult = p
                    .persist_transition(&result)
                    .map_err(translate_persistence_error)?;
                build_create_response(&result, &persisted)
            })
            .await?;

        info!(
            employee_id,
            shift_id,
            %range,
            force,
            assignment_id = response.assignment.assignment_id,
            mutations = response.mutations.len(),
            "Scheduled employee"
        );
        Ok(response)
    }

    /// Deletes one assignment.
    ///
    /// # Returns
    ///
    /// The event ID of the persisted audit event.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if the assignment does not exist.
    pub async fn delete_assignment(
        &self,
        assignment_id: i64,
        actor: Actor,
        cause: Cause,
    ) -> Result<i64, ApiError> {
        let target: ScheduleAssignment = self
            .with_persistence("load_assignment", |p| load_assignment(p, assignment_id))
            .await?;
        let employee_id: i64 = target.employee_id();

        let _guard = self.employee_locks.lock(employee_id).await;
        let event_id: i64 = self
            .with_persistence("delete_assignment", |p| {
                // Re-read under the lock; a concurrent request may have removed it.
                let current: ScheduleAssignment = load_assignment(p, assignment_id)?;
                let state: EmployeeSchedule = EmployeeSchedule::new(employee_id, vec![current]);
                let result: TransitionResult = apply(
                    &state,
                    Command::DeleteAssignment { assignment_id },
                    actor.clone(),
                    cause.clone(),
                )
                .map_err(translate_core_error)?;
                p.persist_transition(&result)
                    .map(|persisted| persisted.event_id)
                    .map_err(translate_persistence_error)
            })
            .await?;

        info!(assignment_id, employee_id, event_id, "Deleted assignment");
        Ok(event_id)
    }

    /// Schedules every member of the requested departments.
    ///
    /// Each employee is resolved independently through a bounded worker pool.
    /// A failure for one employee is reported and never aborts the others.
    ///
    /// # Errors
    ///
    /// Returns an error only when the request itself is invalid: a malformed
    /// range, no departments, or an unknown shift or department.
    pub async fn batch_create(
        &self,
        request: &BatchCreateRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<BatchCreateResponse, ApiError> {
        let range: DateRange = parse_range(&request.start_date, &request.end_date)?;
        if request.department_ids.is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("department_ids"),
                message: String::from("At least one department is required"),
            });
        }
        let shift_id: i64 = request.shift_id;
        let force: bool = request.force;

        let targets: BatchTargets = self
            .with_persistence("resolve_batch_targets", |p| {
                require_shift(p, shift_id)?;
                let departments: Vec<Department> =
                    require_departments(p, &request.department_ids)?;
                let selected: BTreeSet<i64> = expand_departments(
                    &request.department_ids,
                    &departments,
                    request.include_sub_departments,
                );
                let selected_ids: Vec<i64> = selected.iter().copied().collect();
                let employees: Vec<Employee> = p
                    .list_employees(Some(&selected_ids))
                    .map_err(translate_persistence_error)?;
                Ok(select_batch_targets(&selected, &employees))
            })
            .await?;

        info!(
            shift_id,
            %range,
            force,
            targets = targets.employee_ids.len(),
            rejected = targets.rejected.len(),
            "Starting batch scheduling"
        );

        let mut failures: Vec<BatchFailure> = targets
            .rejected
            .iter()
            .map(|(employee_id, reason)| BatchFailure {
                employee_id: *employee_id,
                reason: reason.clone(),
            })
            .collect();

        let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(self.config.batch_concurrency));
        let mut tasks: JoinSet<(i64, Result<CreateAssignmentResponse, ApiError>)> =
            JoinSet::new();
        for employee_id in targets.employee_ids.iter().copied() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ApiError::Internal {
                    message: format!("Batch worker pool closed: {e}"),
                })?;
            let engine: Self = self.clone();
            let actor: Actor = actor.clone();
            let cause: Cause = cause.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = engine
                    .schedule_employee(employee_id, shift_id, range, force, actor, cause)
                    .await;
                (employee_id, outcome)
            });
        }

        let mut count: usize = 0;
        let mut reported: BTreeSet<i64> = BTreeSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((employee_id, Ok(_))) => {
                    reported.insert(employee_id);
                    count += 1;
                }
                Ok((employee_id, Err(err))) => {
                    reported.insert(employee_id);
                    warn!(employee_id, error = %err, "Batch scheduling failed for employee");
                    failures.push(BatchFailure {
                        employee_id,
                        reason: err.to_string(),
                    });
                }
                Err(err) => error!(error = %err, "Batch scheduling task failed"),
            }
        }

        for employee_id in targets
            .employee_ids
            .iter()
            .filter(|id| !reported.contains(id))
        {
            failures.push(BatchFailure {
                employee_id: *employee_id,
                reason: String::from("Scheduling task did not complete"),
            });
        }
        failures.sort_by_key(|f| f.employee_id);

        info!(count, failures = failures.len(), "Batch scheduling finished");
        Ok(BatchCreateResponse { count, failures })
    }

    /// Lists assignments intersecting a range for one employee or department.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed or names an unknown
    /// employee or department.
    pub async fn list_schedules(
        &self,
        query: &ListSchedulesQuery,
    ) -> Result<ListSchedulesResponse, ApiError> {
        let range: DateRange = parse_range(&query.start_date, &query.end_date)?;

        let assignments: Vec<ScheduleAssignment> = match (query.employee_id, query.department_id)
        {
            (Some(employee_id), None) => {
                self.with_persistence("list_schedules", |p| {
                    require_employee(p, employee_id)?;
                    p.list_assignments_for_employee(employee_id, range)
                        .map_err(translate_persistence_error)
                })
                .await?
            }
            (None, Some(department_id)) => {
                self.with_persistence("list_schedules", |p| {
                    let departments: Vec<Department> = require_departments(p, &[department_id])?;
                    let selected: Vec<i64> = expand_departments(
                        &[department_id],
                        &departments,
                        query.include_sub_departments,
                    )
                    .into_iter()
                    .collect();
                    p.list_assignments_for_departments(&selected, range)
                        .map_err(translate_persistence_error)
                })
                .await?
            }
            _ => {
                return Err(ApiError::InvalidInput {
                    field: String::from("employee_id"),
                    message: String::from(
                        "Exactly one of employee_id and department_id is required",
                    ),
                });
            }
        };

        Ok(ListSchedulesResponse {
            assignments: assignments
                .iter()
                .map(AssignmentInfo::from_assignment)
                .collect(),
        })
    }

    /// Expands an employee's schedule into one entry per day.
    ///
    /// Days without an assignment and rest days carry no periods.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is malformed or longer than
    /// [`MAX_CALENDAR_DAYS`], or the employee does not exist.
    pub async fn schedule_calendar(&self, query: &CalendarQuery) -> Result<CalendarResponse, ApiError> {
        let range: DateRange = parse_range(&query.start_date, &query.end_date)?;
        if range.len_days() > MAX_CALENDAR_DAYS {
            return Err(ApiError::InvalidInput {
                field: String::from("end_date"),
                message: format!("A calendar spans at most {MAX_CALENDAR_DAYS} days"),
            });
        }
        let employee_id: i64 = query.employee_id;

        self.with_persistence("schedule_calendar", |p| {
            require_employee(p, employee_id)?;
            let settings = p
                .get_current_settings()
                .map_err(translate_persistence_error)?;
            let assignments: Vec<ScheduleAssignment> = p
                .list_assignments_for_employee(employee_id, range)
                .map_err(translate_persistence_error)?;

            let mut shifts: BTreeMap<i64, Shift> = BTreeMap::new();
            for assignment in &assignments {
                if !shifts.contains_key(&assignment.shift_id()) {
                    shifts.insert(assignment.shift_id(), require_shift(p, assignment.shift_id())?);
                }
            }
            let period_ids: Vec<i64> = shifts
                .values()
                .flat_map(Shift::referenced_period_ids)
                .collect::<BTreeSet<i64>>()
                .into_iter()
                .collect();
            let periods: Vec<TimePeriod> = p
                .get_time_periods(&period_ids)
                .map_err(translate_persistence_error)?;

            let mut days: Vec<CalendarDayInfo> = Vec::new();
            for day in range.days() {
                let Some(assignment) = active_on(&assignments, day) else {
                    days.push(CalendarDayInfo {
                        date: format_date(day),
                        assignment_id: None,
                        shift_id: None,
                        day_of_cycle: None,
                        periods: Vec::new(),
                    });
                    continue;
                };
                let shift: &Shift = shifts.get(&assignment.shift_id()).ok_or_else(|| {
                    translate_domain_error(DomainError::ShiftNotFound(assignment.shift_id()))
                })?;
                let expected: Vec<ExpectedPeriod> =
                    expected_periods(assignment, shift, &periods, day, &settings)
                        .map_err(translate_domain_error)?;
                days.push(CalendarDayInfo {
                    date: format_date(day),
                    assignment_id: assignment.assignment_id(),
                    shift_id: Some(assignment.shift_id()),
                    day_of_cycle: Some(shift.day_of_cycle(assignment.cycle_anchor(), day)),
                    periods: expected.iter().map(ExpectedPeriodInfo::from_period).collect(),
                });
            }

            Ok(CalendarResponse { employee_id, days })
        })
        .await
    }
}

fn load_assignment(
    persistence: &mut Persistence,
    assignment_id: i64,
) -> Result<ScheduleAssignment, ApiError> {
    persistence
        .get_assignment(assignment_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::AssignmentNotFound(assignment_id)))
}

fn build_create_response(
    result: &TransitionResult,
    persisted: &PersistTransitionResult,
) -> Result<CreateAssignmentResponse, ApiError> {
    let SchedulePlan::Create(plan) = &result.plan else {
        return Err(ApiError::Internal {
            message: String::from("Create command produced a delete plan"),
        });
    };
    let created: &ScheduleAssignment = persisted.created.as_ref().ok_or_else(|| {
        ApiError::Internal {
            message: String::from("Stored transition returned no assignment"),
        }
    })?;

    Ok(CreateAssignmentResponse {
        assignment: AssignmentInfo::from_assignment(created),
        mutations: plan.mutations.iter().map(MutationInfo::from_mutation).collect(),
        created_remainders: persisted
            .remainders
            .iter()
            .map(AssignmentInfo::from_assignment)
            .collect(),
        event_id: persisted.event_id,
    })
}
