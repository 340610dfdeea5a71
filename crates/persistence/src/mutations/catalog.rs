// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog mutations: departments, employees, time periods, shifts and settings.

use clockwork_domain::{
    AttendanceSettings, Department, Employee, Shift, TimePeriod, format_clock_time,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{
    attendance_settings, departments, employees, shift_days, shifts, time_periods,
};
use crate::error::PersistenceError;

/// Inserts a department.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_department(
    conn: &mut SqliteConnection,
    name: &str,
    parent_id: Option<i64>,
) -> Result<Department, PersistenceError> {
    diesel::insert_into(departments::table)
        .values((
            departments::name.eq(name),
            departments::parent_id.eq(parent_id),
        ))
        .execute(conn)?;
    let department_id: i64 = conn.get_last_insert_rowid()?;
    debug!(department_id, name, "Inserted department");

    Ok(Department {
        department_id,
        name: name.to_string(),
        parent_id,
    })
}

/// Inserts an employee.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_employee(
    conn: &mut SqliteConnection,
    name: &str,
    department_id: i64,
    active: bool,
) -> Result<Employee, PersistenceError> {
    diesel::insert_into(employees::table)
        .values((
            employees::name.eq(name),
            employees::department_id.eq(department_id),
            employees::active.eq(i32::from(active)),
        ))
        .execute(conn)?;
    let employee_id: i64 = conn.get_last_insert_rowid()?;
    debug!(employee_id, department_id, "Inserted employee");

    Ok(Employee {
        employee_id,
        name: name.to_string(),
        department_id,
        active,
    })
}

/// Inserts a time period and returns it with its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails or a grace value does not fit the column.
pub fn insert_time_period(
    conn: &mut SqliteConnection,
    period: &TimePeriod,
) -> Result<TimePeriod, PersistenceError> {
    let late: i32 = period.late_grace_minutes().to_i32().ok_or_else(|| {
        PersistenceError::Other(String::from("late grace does not fit the column"))
    })?;
    let early_leave: i32 = period.early_leave_grace_minutes().to_i32().ok_or_else(|| {
        PersistenceError::Other(String::from("early leave grace does not fit the column"))
    })?;

    diesel::insert_into(time_periods::table)
        .values((
            time_periods::name.eq(period.name()),
            time_periods::kind.eq(period.kind().as_str()),
            time_periods::start_time.eq(format_clock_time(period.start_time())),
            time_periods::end_time.eq(format_clock_time(period.end_time())),
            time_periods::rest_start.eq(period.rest().map(|r| format_clock_time(r.start()))),
            time_periods::rest_end.eq(period.rest().map(|r| format_clock_time(r.end()))),
            time_periods::check_in_start.eq(format_clock_time(period.check_in_window().start())),
            time_periods::check_in_end.eq(format_clock_time(period.check_in_window().end())),
            time_periods::check_out_start.eq(format_clock_time(period.check_out_window().start())),
            time_periods::check_out_end.eq(format_clock_time(period.check_out_window().end())),
            time_periods::late_grace_minutes.eq(late),
            time_periods::early_leave_grace_minutes.eq(early_leave),
        ))
        .execute(conn)?;
    let period_id: i64 = conn.get_last_insert_rowid()?;
    debug!(period_id, name = period.name(), "Inserted time period");

    Ok(period.clone().with_id(period_id))
}

/// Marks `original_id` as replaced and repoints every shift position that used it.
///
/// # Returns
///
/// The number of shift positions repointed.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the original does not exist or was
/// already replaced.
pub fn retire_time_period(
    conn: &mut SqliteConnection,
    original_id: i64,
    replacement_id: i64,
) -> Result<usize, PersistenceError> {
    let retired: usize = diesel::update(
        time_periods::table
            .filter(time_periods::period_id.eq(original_id))
            .filter(time_periods::replaced_by.is_null()),
    )
    .set(time_periods::replaced_by.eq(Some(replacement_id)))
    .execute(conn)?;
    if retired == 0 {
        return Err(PersistenceError::NotFound(format!(
            "replaceable time period {original_id}"
        )));
    }

    let repointed: usize =
        diesel::update(shift_days::table.filter(shift_days::period_id.eq(original_id)))
            .set(shift_days::period_id.eq(replacement_id))
            .execute(conn)?;
    debug!(original_id, replacement_id, repointed, "Repointed shift days");

    Ok(repointed)
}

/// Inserts a shift and its cycle table.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_shift(conn: &mut SqliteConnection, shift: &Shift) -> Result<Shift, PersistenceError> {
    diesel::insert_into(shifts::table)
        .values((
            shifts::name.eq(shift.name()),
            shifts::cycle_days.eq(i32::from(shift.cycle_days())),
        ))
        .execute(conn)?;
    let shift_id: i64 = conn.get_last_insert_rowid()?;

    for (index, period_ids) in shift.days().iter().enumerate() {
        let day_of_cycle: i32 = (index + 1).to_i32().ok_or_else(|| {
            PersistenceError::Other(format!("cycle position {index} does not fit the column"))
        })?;
        for period_id in period_ids {
            diesel::insert_into(shift_days::table)
                .values((
                    shift_days::shift_id.eq(shift_id),
                    shift_days::day_of_cycle.eq(day_of_cycle),
                    shift_days::period_id.eq(*period_id),
                ))
                .execute(conn)?;
        }
    }
    debug!(shift_id, cycle_days = shift.cycle_days(), "Inserted shift");

    Ok(shift.clone().with_id(shift_id))
}

/// Inserts a new settings version.
///
/// # Errors
///
/// Returns an error if the insert fails, including when the version exists.
pub fn insert_settings(
    conn: &mut SqliteConnection,
    settings: &AttendanceSettings,
) -> Result<(), PersistenceError> {
    diesel::insert_into(attendance_settings::table)
        .values((
            attendance_settings::version.eq(settings.version),
            attendance_settings::day_switch_time.eq(format_clock_time(settings.day_switch_time)),
            attendance_settings::auto_calc_time.eq(format_clock_time(settings.auto_calc_time)),
            attendance_settings::timezone.eq(settings.timezone.as_str()),
        ))
        .execute(conn)?;
    debug!(version = settings.version, "Inserted settings version");
    Ok(())
}
