// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedule assignment queries.
//!
//! Dates are stored as `YYYY-MM-DD` text, so lexical comparison is date
//! comparison and the intersect test runs in SQL.

use clockwork_domain::{DateRange, ScheduleAssignment, format_date, parse_date, parse_date_range};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Date;

use crate::diesel_schema::{employees, schedule_assignments};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schedule_assignments)]
struct AssignmentRow {
    assignment_id: i64,
    employee_id: i64,
    shift_id: i64,
    start_date: String,
    end_date: String,
    cycle_anchor: String,
    created_at: Option<String>,
}

fn to_assignment(row: AssignmentRow) -> Result<ScheduleAssignment, PersistenceError> {
    let range: DateRange = parse_date_range(&row.start_date, &row.end_date)?;
    Ok(ScheduleAssignment::with_id(
        row.assignment_id,
        row.employee_id,
        row.shift_id,
        range,
        parse_date(&row.cycle_anchor)?,
        row.created_at,
    ))
}

/// Looks up one assignment.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_assignment(
    conn: &mut SqliteConnection,
    assignment_id: i64,
) -> Result<Option<ScheduleAssignment>, PersistenceError> {
    schedule_assignments::table
        .filter(schedule_assignments::assignment_id.eq(assignment_id))
        .select(AssignmentRow::as_select())
        .first(conn)
        .optional()?
        .map(to_assignment)
        .transpose()
}

/// Lists an employee's assignments intersecting `range`, ordered by start date.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_assignments_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
    range: DateRange,
) -> Result<Vec<ScheduleAssignment>, PersistenceError> {
    schedule_assignments::table
        .filter(schedule_assignments::employee_id.eq(employee_id))
        .filter(schedule_assignments::start_date.le(format_date(range.end())))
        .filter(schedule_assignments::end_date.ge(format_date(range.start())))
        .select(AssignmentRow::as_select())
        .order((
            schedule_assignments::start_date.asc(),
            schedule_assignments::assignment_id.asc(),
        ))
        .load(conn)?
        .into_iter()
        .map(to_assignment)
        .collect()
}

/// Lists every assignment of an employee, ordered by start date.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_all_assignments_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<ScheduleAssignment>, PersistenceError> {
    schedule_assignments::table
        .filter(schedule_assignments::employee_id.eq(employee_id))
        .select(AssignmentRow::as_select())
        .order(schedule_assignments::start_date.asc())
        .load(conn)?
        .into_iter()
        .map(to_assignment)
        .collect()
}

/// Lists assignments of every employee in the given departments intersecting `range`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_assignments_for_departments(
    conn: &mut SqliteConnection,
    department_ids: &[i64],
    range: DateRange,
) -> Result<Vec<ScheduleAssignment>, PersistenceError> {
    schedule_assignments::table
        .inner_join(employees::table)
        .filter(employees::department_id.eq_any(department_ids.to_vec()))
        .filter(schedule_assignments::start_date.le(format_date(range.end())))
        .filter(schedule_assignments::end_date.ge(format_date(range.start())))
        .select(AssignmentRow::as_select())
        .order((
            schedule_assignments::employee_id.asc(),
            schedule_assignments::start_date.asc(),
        ))
        .load(conn)?
        .into_iter()
        .map(to_assignment)
        .collect()
}

/// Returns the assignment covering `day` for an employee, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn assignment_covering(
    conn: &mut SqliteConnection,
    employee_id: i64,
    day: Date,
) -> Result<Option<ScheduleAssignment>, PersistenceError> {
    let day: String = format_date(day);
    schedule_assignments::table
        .filter(schedule_assignments::employee_id.eq(employee_id))
        .filter(schedule_assignments::start_date.le(day.as_str()))
        .filter(schedule_assignments::end_date.ge(day.as_str()))
        .select(AssignmentRow::as_select())
        .first(conn)
        .optional()?
        .map(to_assignment)
        .transpose()
}
