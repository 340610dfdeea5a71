// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog maintenance, attendance inputs, settings and audit queries.

use clockwork::{CatalogCommand, CatalogResult, apply_catalog};
use clockwork_audit::{Actor, AuditEvent, Cause};
use clockwork_domain::{
    AttendanceSettings, ClockRecord, ClockSource, ClockType, ClockWindow, CorrectionRecord,
    DomainError, LeaveCategory, LeaveRecord, PeriodKind, Shift, TimePeriod, parse_clock_time,
    parse_date, parse_local_datetime,
};
use clockwork_persistence::{CatalogOutcome, PersistCatalogResult, Persistence};
use time::Time;
use tracing::info;

use crate::engine::Engine;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AuditEventInfo, ClockRecordInfo, ClockRecordRequest, CorrectionInfo, CorrectionRequest,
    CorrectionResponse, CreateDepartmentRequest, CreateDepartmentResponse, CreateEmployeeRequest,
    CreateEmployeeResponse, CreateShiftRequest, CreateShiftResponse, CreateTimePeriodResponse,
    DailyRecordInfo, DepartmentInfo, EmployeeInfo, LeaveInfo, LeaveRequest,
    ReplaceTimePeriodResponse, SettingsInfo, ShiftInfo, TimePeriodInfo, TimePeriodRequest,
    UpdateSettingsRequest, UpdateSettingsResponse,
};
use crate::schedule::require_employee;

fn parse_time_field(field: &str, value: &str) -> Result<Time, ApiError> {
    parse_clock_time(value).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Builds an unpersisted period from its wire form.
fn period_from_request(request: &TimePeriodRequest) -> Result<TimePeriod, ApiError> {
    let kind: PeriodKind = PeriodKind::parse(&request.kind).map_err(translate_domain_error)?;
    let rest: Option<ClockWindow> = match (&request.rest_start, &request.rest_end) {
        (Some(start), Some(end)) => Some(ClockWindow::new(
            parse_time_field("rest_start", start)?,
            parse_time_field("rest_end", end)?,
        )),
        (None, None) => None,
        _ => {
            return Err(ApiError::InvalidInput {
                field: String::from("rest_start"),
                message: String::from("rest_start and rest_end must be given together"),
            });
        }
    };

    Ok(TimePeriod::new(
        &request.name,
        kind,
        parse_time_field("start_time", &request.start_time)?,
        parse_time_field("end_time", &request.end_time)?,
        ClockWindow::new(
            parse_time_field("check_in_start", &request.check_in_start)?,
            parse_time_field("check_in_end", &request.check_in_end)?,
        ),
        ClockWindow::new(
            parse_time_field("check_out_start", &request.check_out_start)?,
            parse_time_field("check_out_end", &request.check_out_end)?,
        ),
    )
    .with_rest(rest)
    .with_grace(request.late_grace_minutes, request.early_leave_grace_minutes))
}

/// Validates a catalog command against a snapshot and stores it.
fn apply_and_persist(
    persistence: &mut Persistence,
    command: CatalogCommand,
    actor: &Actor,
    cause: &Cause,
) -> Result<PersistCatalogResult, ApiError> {
    let result: CatalogResult =
        apply_catalog(command, actor.clone(), cause.clone()).map_err(translate_core_error)?;
    persistence
        .persist_catalog(&result)
        .map_err(translate_persistence_error)
}

fn unexpected_outcome(operation: &str) -> ApiError {
    ApiError::Internal {
        message: format!("{operation} stored an unexpected catalog outcome"),
    }
}

impl Engine {
    // ========================================================================
    // Time periods and shifts
    // ========================================================================

    /// Defines a new time period.
    ///
    /// # Errors
    ///
    /// Returns an error if any time is malformed or the period is invalid.
    pub async fn create_time_period(
        &self,
        request: &TimePeriodRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<CreateTimePeriodResponse, ApiError> {
        let period: TimePeriod = period_from_request(request)?;

        let stored: PersistCatalogResult = self
            .with_persistence("create_time_period", |p| {
                apply_and_persist(
                    p,
                    CatalogCommand::CreateTimePeriod {
                        period: period.clone(),
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::TimePeriod(created) = stored.outcome else {
            return Err(unexpected_outcome("create_time_period"));
        };

        info!(period_id = created.period_id(), name = created.name(), "Created time period");
        Ok(CreateTimePeriodResponse {
            time_period: TimePeriodInfo::from_period(&created),
            event_id: stored.event_id,
        })
    }

    /// Supersedes a time period.
    ///
    /// Stored periods are never edited in place: the replacement is a new
    /// period and every shift position referencing the original is repointed
    /// to it in the same transaction. Daily records already computed keep the
    /// resolved periods they were computed with.
    ///
    /// # Errors
    ///
    /// Returns an error if the original does not exist or was already
    /// replaced, or the replacement is invalid.
    pub async fn replace_time_period(
        &self,
        period_id: i64,
        request: &TimePeriodRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<ReplaceTimePeriodResponse, ApiError> {
        let replacement: TimePeriod = period_from_request(request)?;

        let stored: PersistCatalogResult = self
            .with_persistence("replace_time_period", |p| {
                let original: TimePeriod = p
                    .get_time_period(period_id)
                    .map_err(translate_persistence_error)?
                    .ok_or_else(|| {
                        translate_domain_error(DomainError::TimePeriodNotFound(period_id))
                    })?;
                let shifts: Vec<Shift> = p
                    .list_shifts_referencing(period_id)
                    .map_err(translate_persistence_error)?;
                apply_and_persist(
                    p,
                    CatalogCommand::ReplaceTimePeriod {
                        original,
                        replacement: replacement.clone(),
                        shifts,
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::Replacement {
            replacement,
            repointed_positions,
        } = stored.outcome
        else {
            return Err(unexpected_outcome("replace_time_period"));
        };

        info!(
            period_id,
            replacement_id = replacement.period_id(),
            repointed_positions,
            "Replaced time period"
        );
        Ok(ReplaceTimePeriodResponse {
            replaced_period_id: period_id,
            replacement: TimePeriodInfo::from_period(&replacement),
            repointed_positions,
            event_id: stored.event_id,
        })
    }

    /// Lists time periods, optionally including superseded ones.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn list_time_periods(
        &self,
        include_replaced: bool,
    ) -> Result<Vec<TimePeriodInfo>, ApiError> {
        let periods: Vec<TimePeriod> = self
            .with_persistence("list_time_periods", |p| {
                p.list_time_periods(include_replaced)
                    .map_err(translate_persistence_error)
            })
            .await?;
        Ok(periods.iter().map(TimePeriodInfo::from_period).collect())
    }

    /// Defines a new cyclic shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the cycle is invalid or references unknown periods.
    pub async fn create_shift(
        &self,
        request: &CreateShiftRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<CreateShiftResponse, ApiError> {
        let positions: Vec<(u16, Vec<i64>)> = request
            .days
            .iter()
            .map(|d| (d.day_of_cycle, d.period_ids.clone()))
            .collect();
        let shift: Shift = Shift::from_positions(&request.name, request.cycle_days, &positions)
            .map_err(translate_domain_error)?;

        let stored: PersistCatalogResult = self
            .with_persistence("create_shift", |p| {
                let known_periods: Vec<TimePeriod> = p
                    .list_time_periods(true)
                    .map_err(translate_persistence_error)?;
                apply_and_persist(
                    p,
                    CatalogCommand::CreateShift {
                        shift: shift.clone(),
                        known_periods,
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::Shift(created) = stored.outcome else {
            return Err(unexpected_outcome("create_shift"));
        };

        info!(
            shift_id = created.shift_id(),
            cycle_days = created.cycle_days(),
            "Created shift"
        );
        Ok(CreateShiftResponse {
            shift: ShiftInfo::from_shift(&created),
            event_id: stored.event_id,
        })
    }

    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn list_shifts(&self) -> Result<Vec<ShiftInfo>, ApiError> {
        let shifts: Vec<Shift> = self
            .with_persistence("list_shifts", |p| {
                p.list_shifts().map_err(translate_persistence_error)
            })
            .await?;
        Ok(shifts.iter().map(ShiftInfo::from_shift).collect())
    }

    // ========================================================================
    // Organization
    // ========================================================================

    /// Adds a department, optionally below a parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the parent does not exist.
    pub async fn create_department(
        &self,
        request: &CreateDepartmentRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<CreateDepartmentResponse, ApiError> {
        let stored: PersistCatalogResult = self
            .with_persistence("create_department", |p| {
                if let Some(parent_id) = request.parent_id {
                    let parent = p
                        .get_department(parent_id)
                        .map_err(translate_persistence_error)?;
                    if parent.is_none() {
                        return Err(translate_domain_error(DomainError::DepartmentNotFound(
                            parent_id,
                        )));
                    }
                }
                apply_and_persist(
                    p,
                    CatalogCommand::CreateDepartment {
                        name: request.name.clone(),
                        parent_id: request.parent_id,
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::Department(department) = stored.outcome else {
            return Err(unexpected_outcome("create_department"));
        };

        info!(department_id = department.department_id, "Created department");
        Ok(CreateDepartmentResponse {
            department: DepartmentInfo::from_department(&department),
            event_id: stored.event_id,
        })
    }

    /// Adds an employee to a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the department does not exist.
    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<CreateEmployeeResponse, ApiError> {
        let stored: PersistCatalogResult = self
            .with_persistence("create_employee", |p| {
                if p.get_department(request.department_id)
                    .map_err(translate_persistence_error)?
                    .is_none()
                {
                    return Err(translate_domain_error(DomainError::DepartmentNotFound(
                        request.department_id,
                    )));
                }
                apply_and_persist(
                    p,
                    CatalogCommand::CreateEmployee {
                        name: request.name.clone(),
                        department_id: request.department_id,
                        active: request.active,
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::Employee(employee) = stored.outcome else {
            return Err(unexpected_outcome("create_employee"));
        };

        info!(
            employee_id = employee.employee_id,
            department_id = employee.department_id,
            "Created employee"
        );
        Ok(CreateEmployeeResponse {
            employee: EmployeeInfo::from_employee(&employee),
            event_id: stored.event_id,
        })
    }

    // ========================================================================
    // Attendance inputs
    // ========================================================================

    /// Appends a raw clock event.
    ///
    /// Clock events are never edited; corrections add synthetic events.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or a field is malformed.
    pub async fn record_clock(&self, request: &ClockRecordRequest) -> Result<ClockRecordInfo, ApiError> {
        let clock_time = parse_local_datetime(&request.clock_time).map_err(translate_domain_error)?;
        let clock_type: ClockType =
            ClockType::parse(&request.clock_type).map_err(translate_domain_error)?;
        let source: ClockSource = match request.source.as_deref() {
            None => ClockSource::Device,
            Some(raw) => ClockSource::parse(raw).map_err(translate_domain_error)?,
        };
        if source == ClockSource::Correction {
            return Err(ApiError::InvalidInput {
                field: String::from("source"),
                message: String::from("Correction clock events are created by submitting a correction"),
            });
        }
        let employee_id: i64 = request.employee_id;

        let record: ClockRecord = self
            .with_persistence("record_clock", |p| {
                require_employee(p, employee_id)?;
                p.insert_clock_record(employee_id, clock_time, clock_type, source)
                    .map_err(translate_persistence_error)
            })
            .await?;
        Ok(ClockRecordInfo::from_record(&record))
    }

    /// Records leave or a business trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or the record is invalid.
    pub async fn record_leave(&self, request: &LeaveRequest) -> Result<LeaveInfo, ApiError> {
        let leave: LeaveRecord = LeaveRecord {
            leave_id: 0,
            employee_id: request.employee_id,
            category: LeaveCategory::parse(&request.category).map_err(translate_domain_error)?,
            start: parse_local_datetime(&request.start).map_err(translate_domain_error)?,
            end: parse_local_datetime(&request.end).map_err(translate_domain_error)?,
            approved: request.approved,
        };
        leave.validate().map_err(translate_domain_error)?;

        let stored: LeaveRecord = self
            .with_persistence("record_leave", |p| {
                require_employee(p, leave.employee_id)?;
                p.insert_leave(&leave).map_err(translate_persistence_error)
            })
            .await?;
        info!(
            leave_id = stored.leave_id,
            employee_id = stored.employee_id,
            category = stored.category.as_str(),
            approved = stored.approved,
            "Recorded leave"
        );
        Ok(LeaveInfo::from_record(&stored))
    }

    /// Stores a clock correction.
    ///
    /// An approved correction adds a synthetic clock event and immediately
    /// recalculates the corrected work date.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist, a field is malformed,
    /// or the recalculation fails.
    pub async fn submit_correction(
        &self,
        request: &CorrectionRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<CorrectionResponse, ApiError> {
        let correction: CorrectionRecord = CorrectionRecord {
            correction_id: 0,
            employee_id: request.employee_id,
            work_date: parse_date(&request.work_date).map_err(translate_domain_error)?,
            clock_type: ClockType::parse(&request.clock_type).map_err(translate_domain_error)?,
            clock_time: parse_local_datetime(&request.clock_time).map_err(translate_domain_error)?,
            reason: request.reason.clone(),
            approved: request.approved,
            clock_record_id: None,
        };

        let stored: PersistCatalogResult = self
            .with_persistence("submit_correction", |p| {
                require_employee(p, correction.employee_id)?;
                let settings: AttendanceSettings =
                    p.get_current_settings().map_err(translate_persistence_error)?;
                apply_and_persist(
                    p,
                    CatalogCommand::SubmitCorrection {
                        correction: correction.clone(),
                        settings,
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::Correction(saved) = stored.outcome else {
            return Err(unexpected_outcome("submit_correction"));
        };

        info!(
            correction_id = saved.correction_id,
            employee_id = saved.employee_id,
            approved = saved.approved,
            "Stored correction"
        );

        let daily_record: Option<DailyRecordInfo> = if saved.approved {
            Some(
                self.recalculate_day(saved.employee_id, saved.work_date)
                    .await?,
            )
        } else {
            None
        };

        Ok(CorrectionResponse {
            correction: CorrectionInfo::from_record(&saved),
            event_id: stored.event_id,
            daily_record,
        })
    }

    // ========================================================================
    // Settings and audit
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn get_settings(&self) -> Result<SettingsInfo, ApiError> {
        let settings: AttendanceSettings = self.current_settings().await?;
        Ok(SettingsInfo::from_settings(&settings))
    }

    /// Publishes a new settings version.
    ///
    /// Daily records keep the version they were computed with; only later
    /// recalculations use the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if a time or the timezone is invalid.
    pub async fn update_settings(
        &self,
        request: &UpdateSettingsRequest,
        actor: Actor,
        cause: Cause,
    ) -> Result<UpdateSettingsResponse, ApiError> {
        let requested: AttendanceSettings = AttendanceSettings {
            version: 0,
            day_switch_time: parse_time_field("day_switch_time", &request.day_switch_time)?,
            auto_calc_time: parse_time_field("auto_calc_time", &request.auto_calc_time)?,
            timezone: request.timezone.trim().to_string(),
        };

        let stored: PersistCatalogResult = self
            .with_persistence("update_settings", |p| {
                let current: AttendanceSettings = p
                    .get_current_settings()
                    .map_err(translate_persistence_error)?;
                apply_and_persist(
                    p,
                    CatalogCommand::UpdateSettings {
                        current,
                        requested: requested.clone(),
                    },
                    &actor,
                    &cause,
                )
            })
            .await?;
        let CatalogOutcome::Settings(settings) = stored.outcome else {
            return Err(unexpected_outcome("update_settings"));
        };

        info!(
            version = settings.version,
            timezone = %settings.timezone,
            "Published attendance settings"
        );
        Ok(UpdateSettingsResponse {
            settings: SettingsInfo::from_settings(&settings),
            event_id: stored.event_id,
        })
    }

    /// Lists audit events, optionally for one employee.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn list_audit_events(
        &self,
        employee_id: Option<i64>,
    ) -> Result<Vec<AuditEventInfo>, ApiError> {
        let events: Vec<AuditEvent> = self
            .with_persistence("list_audit_events", |p| {
                p.list_audit_events(employee_id)
                    .map_err(translate_persistence_error)
            })
            .await?;
        Ok(events.iter().map(AuditEventInfo::from_event).collect())
    }
}
