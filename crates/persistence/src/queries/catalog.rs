// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog queries: departments, employees, time periods, shifts and settings.

use clockwork_domain::{
    AttendanceSettings, ClockWindow, Department, Employee, PeriodKind, Shift, TimePeriod,
    parse_clock_time,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

use crate::diesel_schema::{
    attendance_settings, departments, employees, shift_days, shifts, time_periods,
};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = departments)]
struct DepartmentRow {
    department_id: i64,
    name: String,
    parent_id: Option<i64>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = employees)]
struct EmployeeRow {
    employee_id: i64,
    name: String,
    department_id: i64,
    active: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = time_periods)]
struct TimePeriodRow {
    period_id: i64,
    name: String,
    kind: String,
    start_time: String,
    end_time: String,
    rest_start: Option<String>,
    rest_end: Option<String>,
    check_in_start: String,
    check_in_end: String,
    check_out_start: String,
    check_out_end: String,
    late_grace_minutes: i32,
    early_leave_grace_minutes: i32,
    replaced_by: Option<i64>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = shifts)]
struct ShiftRow {
    shift_id: i64,
    name: String,
    cycle_days: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = attendance_settings)]
struct SettingsRow {
    version: i64,
    day_switch_time: String,
    auto_calc_time: String,
    timezone: String,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Self {
            department_id: row.department_id,
            name: row.name,
            parent_id: row.parent_id,
        }
    }
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            employee_id: row.employee_id,
            name: row.name,
            department_id: row.department_id,
            active: row.active != 0,
        }
    }
}

fn to_time_period(row: TimePeriodRow) -> Result<TimePeriod, PersistenceError> {
    let rest: Option<ClockWindow> = match (row.rest_start, row.rest_end) {
        (Some(start), Some(end)) => Some(ClockWindow::new(
            parse_clock_time(&start)?,
            parse_clock_time(&end)?,
        )),
        _ => None,
    };
    let late: u32 = row.late_grace_minutes.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!(
            "negative late grace on time period {}",
            row.period_id
        ))
    })?;
    let early_leave: u32 = row.early_leave_grace_minutes.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!(
            "negative early leave grace on time period {}",
            row.period_id
        ))
    })?;

    Ok(TimePeriod::new(
        &row.name,
        PeriodKind::parse(&row.kind)?,
        parse_clock_time(&row.start_time)?,
        parse_clock_time(&row.end_time)?,
        ClockWindow::new(
            parse_clock_time(&row.check_in_start)?,
            parse_clock_time(&row.check_in_end)?,
        ),
        ClockWindow::new(
            parse_clock_time(&row.check_out_start)?,
            parse_clock_time(&row.check_out_end)?,
        ),
    )
    .with_rest(rest)
    .with_grace(late, early_leave)
    .with_id(row.period_id)
    .with_replaced_by(row.replaced_by))
}

fn to_shift(row: ShiftRow, days: Vec<(i32, i64)>) -> Result<Shift, PersistenceError> {
    let cycle_days: u16 = row.cycle_days.to_u16().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!(
            "cycle length out of range on shift {}",
            row.shift_id
        ))
    })?;

    let mut positions: BTreeMap<u16, Vec<i64>> = BTreeMap::new();
    for (day_of_cycle, period_id) in days {
        let day: u16 = day_of_cycle.to_u16().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "day of cycle {day_of_cycle} out of range on shift {}",
                row.shift_id
            ))
        })?;
        positions.entry(day).or_default().push(period_id);
    }
    let entries: Vec<(u16, Vec<i64>)> = positions.into_iter().collect();

    Ok(Shift::from_positions(&row.name, cycle_days, &entries)?.with_id(row.shift_id))
}

/// Lists every department ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_departments(conn: &mut SqliteConnection) -> Result<Vec<Department>, PersistenceError> {
    let rows: Vec<DepartmentRow> = departments::table
        .select(DepartmentRow::as_select())
        .order(departments::department_id.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(Department::from).collect())
}

/// Looks up one department.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_department(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<Option<Department>, PersistenceError> {
    let row: Option<DepartmentRow> = departments::table
        .filter(departments::department_id.eq(department_id))
        .select(DepartmentRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Department::from))
}

/// Looks up one employee.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Option<Employee>, PersistenceError> {
    let row: Option<EmployeeRow> = employees::table
        .filter(employees::employee_id.eq(employee_id))
        .select(EmployeeRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Employee::from))
}

/// Lists employees, optionally restricted to a set of departments.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_employees(
    conn: &mut SqliteConnection,
    department_ids: Option<&[i64]>,
) -> Result<Vec<Employee>, PersistenceError> {
    let mut query = employees::table
        .select(EmployeeRow::as_select())
        .order(employees::employee_id.asc())
        .into_boxed();
    if let Some(ids) = department_ids {
        query = query.filter(employees::department_id.eq_any(ids.to_vec()));
    }
    let rows: Vec<EmployeeRow> = query.load(conn)?;
    Ok(rows.into_iter().map(Employee::from).collect())
}

/// Lists the ids of every active employee.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_active_employee_ids(conn: &mut SqliteConnection) -> Result<Vec<i64>, PersistenceError> {
    Ok(employees::table
        .filter(employees::active.ne(0))
        .select(employees::employee_id)
        .order(employees::employee_id.asc())
        .load(conn)?)
}

/// Looks up one time period.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_time_period(
    conn: &mut SqliteConnection,
    period_id: i64,
) -> Result<Option<TimePeriod>, PersistenceError> {
    time_periods::table
        .filter(time_periods::period_id.eq(period_id))
        .select(TimePeriodRow::as_select())
        .first(conn)
        .optional()?
        .map(to_time_period)
        .transpose()
}

/// Lists time periods ordered by id.
///
/// Pass `include_replaced = false` to hide periods superseded by a replacement.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_time_periods(
    conn: &mut SqliteConnection,
    include_replaced: bool,
) -> Result<Vec<TimePeriod>, PersistenceError> {
    let mut query = time_periods::table
        .select(TimePeriodRow::as_select())
        .order(time_periods::period_id.asc())
        .into_boxed();
    if !include_replaced {
        query = query.filter(time_periods::replaced_by.is_null());
    }
    query
        .load(conn)?
        .into_iter()
        .map(to_time_period)
        .collect()
}

/// Loads the listed time periods. Unknown ids are skipped.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn get_time_periods(
    conn: &mut SqliteConnection,
    period_ids: &[i64],
) -> Result<Vec<TimePeriod>, PersistenceError> {
    time_periods::table
        .filter(time_periods::period_id.eq_any(period_ids.to_vec()))
        .select(TimePeriodRow::as_select())
        .order(time_periods::period_id.asc())
        .load(conn)?
        .into_iter()
        .map(to_time_period)
        .collect()
}

/// Looks up one shift with its cycle table.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_shift(
    conn: &mut SqliteConnection,
    shift_id: i64,
) -> Result<Option<Shift>, PersistenceError> {
    let Some(row) = shifts::table
        .filter(shifts::shift_id.eq(shift_id))
        .select(ShiftRow::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let days: Vec<(i32, i64)> = shift_days::table
        .filter(shift_days::shift_id.eq(shift_id))
        .select((shift_days::day_of_cycle, shift_days::period_id))
        .order((shift_days::day_of_cycle.asc(), shift_days::period_id.asc()))
        .load(conn)?;

    to_shift(row, days).map(Some)
}

/// Lists every shift with its cycle table.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_shifts(conn: &mut SqliteConnection) -> Result<Vec<Shift>, PersistenceError> {
    let rows: Vec<ShiftRow> = shifts::table
        .select(ShiftRow::as_select())
        .order(shifts::shift_id.asc())
        .load(conn)?;

    let mut days_by_shift: BTreeMap<i64, Vec<(i32, i64)>> = BTreeMap::new();
    let days: Vec<(i64, i32, i64)> = shift_days::table
        .select((
            shift_days::shift_id,
            shift_days::day_of_cycle,
            shift_days::period_id,
        ))
        .load(conn)?;
    for (shift_id, day_of_cycle, period_id) in days {
        days_by_shift
            .entry(shift_id)
            .or_default()
            .push((day_of_cycle, period_id));
    }

    rows.into_iter()
        .map(|row| {
            let days: Vec<(i32, i64)> = days_by_shift.remove(&row.shift_id).unwrap_or_default();
            to_shift(row, days)
        })
        .collect()
}

/// Lists the shifts that reference a time period in any position.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_shifts_referencing(
    conn: &mut SqliteConnection,
    period_id: i64,
) -> Result<Vec<Shift>, PersistenceError> {
    let shift_ids: Vec<i64> = shift_days::table
        .filter(shift_days::period_id.eq(period_id))
        .select(shift_days::shift_id)
        .distinct()
        .load(conn)?;

    let mut found: Vec<Shift> = Vec::with_capacity(shift_ids.len());
    for shift_id in shift_ids {
        if let Some(shift) = get_shift(conn, shift_id)? {
            found.push(shift);
        }
    }
    Ok(found)
}

/// Returns the current attendance settings.
///
/// Falls back to the built-in defaults (version 0) when nothing was stored.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_current_settings(
    conn: &mut SqliteConnection,
) -> Result<AttendanceSettings, PersistenceError> {
    let row: Option<SettingsRow> = attendance_settings::table
        .select(SettingsRow::as_select())
        .order(attendance_settings::version.desc())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(AttendanceSettings::default());
    };

    Ok(AttendanceSettings {
        version: row.version,
        day_switch_time: parse_clock_time(&row.day_switch_time)?,
        auto_calc_time: parse_clock_time(&row.auto_calc_time)?,
        timezone: row.timezone,
    })
}
