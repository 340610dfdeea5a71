// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Clockwork attendance engine.
//!
//! Built on Diesel with the `SQLite` backend. Migrations are embedded and run
//! on open; foreign keys are enforced and verified at startup.
//!
//! ## Layout
//!
//! - `backend`: connection setup, PRAGMAs, migrations
//! - `queries`: read-only lookups
//! - `mutations`: writes, with `transitions` wrapping each domain change
//!   and its audit event in one transaction
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

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
#![allow(clippy::multiple_crate_versions)]

use clockwork::{CatalogResult, TransitionResult};
use clockwork_audit::AuditEvent;
use clockwork_domain::{
    AttendanceSettings, ClockRecord, ClockSource, ClockType, CorrectionRecord, DailyRecord,
    DateRange, Department, Employee, LeaveRecord, ScheduleAssignment, Shift, TimePeriod,
};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, PrimitiveDateTime};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{DailyRecordPage, StoredDailyRecord};
pub use error::PersistenceError;
pub use mutations::{CatalogOutcome, PersistCatalogResult, PersistTransitionResult};

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the scheduling catalog, attendance data and audit trail.
///
/// Holds one connection; callers share it behind a mutex.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_clockwork_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Persists a scheduling transition and its audit event in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails or the stored schedule would overlap.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result)
    }

    /// Persists a catalog change and its audit event in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_catalog(
        &mut self,
        result: &CatalogResult,
    ) -> Result<PersistCatalogResult, PersistenceError> {
        mutations::persist_catalog(&mut self.conn, result)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists a standalone audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Lists audit events, optionally for one employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_audit_events(
        &mut self,
        employee_id: Option<i64>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::list_audit_events(&mut self.conn, employee_id)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_departments(&mut self) -> Result<Vec<Department>, PersistenceError> {
        queries::catalog::list_departments(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_department(
        &mut self,
        department_id: i64,
    ) -> Result<Option<Department>, PersistenceError> {
        queries::catalog::get_department(&mut self.conn, department_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_employee(&mut self, employee_id: i64) -> Result<Option<Employee>, PersistenceError> {
        queries::catalog::get_employee(&mut self.conn, employee_id)
    }

    /// Lists employees, optionally restricted to a set of departments.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_employees(
        &mut self,
        department_ids: Option<&[i64]>,
    ) -> Result<Vec<Employee>, PersistenceError> {
        queries::catalog::list_employees(&mut self.conn, department_ids)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_employee_ids(&mut self) -> Result<Vec<i64>, PersistenceError> {
        queries::catalog::list_active_employee_ids(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_time_period(
        &mut self,
        period_id: i64,
    ) -> Result<Option<TimePeriod>, PersistenceError> {
        queries::catalog::get_time_period(&mut self.conn, period_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_time_periods(
        &mut self,
        include_replaced: bool,
    ) -> Result<Vec<TimePeriod>, PersistenceError> {
        queries::catalog::list_time_periods(&mut self.conn, include_replaced)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_time_periods(
        &mut self,
        period_ids: &[i64],
    ) -> Result<Vec<TimePeriod>, PersistenceError> {
        queries::catalog::get_time_periods(&mut self.conn, period_ids)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_shift(&mut self, shift_id: i64) -> Result<Option<Shift>, PersistenceError> {
        queries::catalog::get_shift(&mut self.conn, shift_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_shifts(&mut self) -> Result<Vec<Shift>, PersistenceError> {
        queries::catalog::list_shifts(&mut self.conn)
    }

    /// Lists the shifts that reference a time period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_shifts_referencing(
        &mut self,
        period_id: i64,
    ) -> Result<Vec<Shift>, PersistenceError> {
        queries::catalog::list_shifts_referencing(&mut self.conn, period_id)
    }

    /// Returns the latest settings version, or the defaults if none was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_current_settings(&mut self) -> Result<AttendanceSettings, PersistenceError> {
        queries::catalog::get_current_settings(&mut self.conn)
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_assignment(
        &mut self,
        assignment_id: i64,
    ) -> Result<Option<ScheduleAssignment>, PersistenceError> {
        queries::schedule::get_assignment(&mut self.conn, assignment_id)
    }

    /// Lists an employee's assignments intersecting `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_assignments_for_employee(
        &mut self,
        employee_id: i64,
        range: DateRange,
    ) -> Result<Vec<ScheduleAssignment>, PersistenceError> {
        queries::schedule::list_assignments_for_employee(&mut self.conn, employee_id, range)
    }

    /// Lists assignments of every employee in the departments intersecting `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_assignments_for_departments(
        &mut self,
        department_ids: &[i64],
        range: DateRange,
    ) -> Result<Vec<ScheduleAssignment>, PersistenceError> {
        queries::schedule::list_assignments_for_departments(&mut self.conn, department_ids, range)
    }

    /// Returns the assignment covering `day`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn assignment_covering(
        &mut self,
        employee_id: i64,
        day: Date,
    ) -> Result<Option<ScheduleAssignment>, PersistenceError> {
        queries::schedule::assignment_covering(&mut self.conn, employee_id, day)
    }

    // ========================================================================
    // Attendance
    // ========================================================================

    /// Appends a clock record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_clock_record(
        &mut self,
        employee_id: i64,
        clock_time: PrimitiveDateTime,
        clock_type: ClockType,
        source: ClockSource,
    ) -> Result<ClockRecord, PersistenceError> {
        mutations::attendance::insert_clock_record(
            &mut self.conn,
            employee_id,
            clock_time,
            clock_type,
            source,
        )
    }

    /// Lists an employee's clock records in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_clock_records(
        &mut self,
        employee_id: i64,
        from: PrimitiveDateTime,
        to: PrimitiveDateTime,
    ) -> Result<Vec<ClockRecord>, PersistenceError> {
        queries::attendance::list_clock_records(&mut self.conn, employee_id, from, to)
    }

    /// Inserts a leave record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_leave(&mut self, leave: &LeaveRecord) -> Result<LeaveRecord, PersistenceError> {
        mutations::attendance::insert_leave(&mut self.conn, leave)
    }

    /// Lists an employee's approved leave overlapping `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_approved_leaves(
        &mut self,
        employee_id: i64,
        from: PrimitiveDateTime,
        to: PrimitiveDateTime,
    ) -> Result<Vec<LeaveRecord>, PersistenceError> {
        queries::attendance::list_approved_leaves(&mut self.conn, employee_id, from, to)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_correction(
        &mut self,
        correction_id: i64,
    ) -> Result<Option<CorrectionRecord>, PersistenceError> {
        queries::attendance::get_correction(&mut self.conn, correction_id)
    }

    /// Writes a daily record, overwriting any previous one for the same cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_daily_record(&mut self, record: &DailyRecord) -> Result<i64, PersistenceError> {
        mutations::attendance::upsert_daily_record(&mut self.conn, record)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_daily_record(
        &mut self,
        employee_id: i64,
        work_date: Date,
    ) -> Result<Option<StoredDailyRecord>, PersistenceError> {
        queries::attendance::get_daily_record(&mut self.conn, employee_id, work_date)
    }

    /// Lists one page of daily records. `page` starts at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_daily_records(
        &mut self,
        employee_id: Option<i64>,
        range: DateRange,
        page: i64,
        page_size: i64,
    ) -> Result<DailyRecordPage, PersistenceError> {
        queries::attendance::list_daily_records(&mut self.conn, employee_id, range, page, page_size)
    }
}
