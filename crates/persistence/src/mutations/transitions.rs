// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! High-level orchestration: one transaction per transition.
//!
//! Every function here writes the domain change and its audit event
//! together. Returning an error from inside the transaction rolls both back.

use clockwork::{CatalogChange, CatalogResult, SchedulePlan, TransitionResult};
use clockwork_domain::{
    AttendanceSettings, CorrectionRecord, Department, Employee, ScheduleAssignment, Shift,
    TimePeriod, verify_non_overlapping,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::mutations::attendance::insert_correction;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::catalog::{
    insert_department, insert_employee, insert_settings, insert_shift, insert_time_period,
    retire_time_period,
};
use crate::mutations::schedule::{apply_mutation, delete_assignment, insert_assignment};
use crate::queries::schedule::list_all_assignments_for_employee;

/// Outcome of persisting a scheduling transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The event ID of the persisted audit event.
    pub event_id: i64,
    /// The newly stored candidate, absent for deletions.
    pub created: Option<ScheduleAssignment>,
    /// Remainders created by splitting existing assignments.
    pub remainders: Vec<ScheduleAssignment>,
}

/// The stored form of a catalog change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome {
    TimePeriod(TimePeriod),
    Replacement {
        replacement: TimePeriod,
        repointed_positions: usize,
    },
    Shift(Shift),
    Department(Department),
    Employee(Employee),
    Settings(AttendanceSettings),
    Correction(CorrectionRecord),
}

/// Outcome of persisting a catalog change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistCatalogResult {
    pub event_id: i64,
    pub outcome: CatalogOutcome,
}

/// Persists a scheduling transition atomically.
///
/// The employee's full schedule is re-read before commit and the
/// transaction is rolled back if any two assignments overlap.
///
/// # Errors
///
/// Returns `PersistenceError::OverlapDetected` if the re-check fails,
/// `PersistenceError::NotFound` if a targeted assignment vanished, or
/// any underlying write error.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let employee_id: i64 = result.new_state.employee_id;

    let persisted: PersistTransitionResult = conn.transaction::<_, PersistenceError, _>(|conn| {
        let (created, remainders) = match &result.plan {
            SchedulePlan::Create(plan) => {
                let mut remainders: Vec<ScheduleAssignment> = Vec::new();
                for mutation in &plan.mutations {
                    remainders.extend(apply_mutation(conn, mutation)?);
                }
                let created: ScheduleAssignment = insert_assignment(conn, &plan.candidate)?;
                (Some(created), remainders)
            }
            SchedulePlan::Delete(target) => {
                let assignment_id: i64 = target.assignment_id().ok_or_else(|| {
                    PersistenceError::Other(String::from("cannot delete an unsaved assignment"))
                })?;
                delete_assignment(conn, assignment_id)?;
                (None, Vec::new())
            }
        };

        let stored: Vec<ScheduleAssignment> = list_all_assignments_for_employee(conn, employee_id)?;
        if verify_non_overlapping(&stored).is_err() {
            warn!(employee_id, "Overlap detected before commit, rolling back");
            return Err(PersistenceError::OverlapDetected { employee_id });
        }

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        Ok(PersistTransitionResult {
            event_id,
            created,
            remainders,
        })
    })?;

    info!(
        event_id = persisted.event_id,
        employee_id,
        action = %result.audit_event.action.name,
        "Persisted transition"
    );
    Ok(persisted)
}

/// Persists a catalog change atomically.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is stored in that case.
pub fn persist_catalog(
    conn: &mut SqliteConnection,
    result: &CatalogResult,
) -> Result<PersistCatalogResult, PersistenceError> {
    let persisted: PersistCatalogResult = conn.transaction::<_, PersistenceError, _>(|conn| {
        let outcome: CatalogOutcome = match &result.change {
            CatalogChange::TimePeriod(period) => {
                CatalogOutcome::TimePeriod(insert_time_period(conn, period)?)
            }
            CatalogChange::Replacement {
                original_id,
                replacement,
                ..
            } => {
                let replacement: TimePeriod = insert_time_period(conn, replacement)?;
                let new_id: i64 = replacement.period_id().ok_or_else(|| {
                    PersistenceError::Other(String::from("stored time period has no id"))
                })?;
                let repointed_positions: usize = retire_time_period(conn, *original_id, new_id)?;
                CatalogOutcome::Replacement {
                    replacement,
                    repointed_positions,
                }
            }
            CatalogChange::Shift(shift) => CatalogOutcome::Shift(insert_shift(conn, shift)?),
            CatalogChange::Department { name, parent_id } => {
                CatalogOutcome::Department(insert_department(conn, name, *parent_id)?)
            }
            CatalogChange::Employee {
                name,
                department_id,
                active,
            } => CatalogOutcome::Employee(insert_employee(conn, name, *department_id, *active)?),
            CatalogChange::Settings(settings) => {
                insert_settings(conn, settings)?;
                CatalogOutcome::Settings(settings.clone())
            }
            CatalogChange::Correction(correction) => {
                CatalogOutcome::Correction(insert_correction(conn, correction)?)
            }
        };

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;
        Ok(PersistCatalogResult { event_id, outcome })
    })?;

    info!(
        event_id = persisted.event_id,
        action = %result.audit_event.action.name,
        "Persisted catalog change"
    );
    Ok(persisted)
}
