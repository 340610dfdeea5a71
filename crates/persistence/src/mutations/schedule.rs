// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedule assignment mutations.
//!
//! These run inside the transition transaction; none of them commits on its own.

use clockwork_domain::{AssignmentMutation, DateRange, ScheduleAssignment, format_date};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::schedule_assignments;
use crate::error::PersistenceError;
use crate::queries::schedule::get_assignment;

/// Inserts an assignment and returns it as stored.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_assignment(
    conn: &mut SqliteConnection,
    assignment: &ScheduleAssignment,
) -> Result<ScheduleAssignment, PersistenceError> {
    diesel::insert_into(schedule_assignments::table)
        .values((
            schedule_assignments::employee_id.eq(assignment.employee_id()),
            schedule_assignments::shift_id.eq(assignment.shift_id()),
            schedule_assignments::start_date.eq(format_date(assignment.start_date())),
            schedule_assignments::end_date.eq(format_date(assignment.end_date())),
            schedule_assignments::cycle_anchor.eq(format_date(assignment.cycle_anchor())),
        ))
        .execute(conn)?;
    let assignment_id: i64 = conn.get_last_insert_rowid()?;
    debug!(
        assignment_id,
        employee_id = assignment.employee_id(),
        "Inserted schedule assignment"
    );

    get_assignment(conn, assignment_id)?.ok_or_else(|| {
        PersistenceError::NotFound(format!("schedule assignment {assignment_id}"))
    })
}

/// Changes the stored range of an assignment. The cycle anchor is kept.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment no longer exists.
pub fn update_assignment_range(
    conn: &mut SqliteConnection,
    assignment_id: i64,
    range: DateRange,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        schedule_assignments::table.filter(schedule_assignments::assignment_id.eq(assignment_id)),
    )
    .set((
        schedule_assignments::start_date.eq(format_date(range.start())),
        schedule_assignments::end_date.eq(format_date(range.end())),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "schedule assignment {assignment_id}"
        )));
    }
    debug!(assignment_id, %range, "Truncated schedule assignment");
    Ok(())
}

/// Deletes an assignment.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment does not exist.
pub fn delete_assignment(
    conn: &mut SqliteConnection,
    assignment_id: i64,
) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(
        schedule_assignments::table.filter(schedule_assignments::assignment_id.eq(assignment_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "schedule assignment {assignment_id}"
        )));
    }
    debug!(assignment_id, "Deleted schedule assignment");
    Ok(())
}

/// Applies one resolver mutation and returns any assignments it created.
///
/// # Errors
///
/// Returns an error if the mutated assignment is gone or a write fails.
pub fn apply_mutation(
    conn: &mut SqliteConnection,
    mutation: &AssignmentMutation,
) -> Result<Vec<ScheduleAssignment>, PersistenceError> {
    let original_id: i64 = mutation.original().assignment_id().ok_or_else(|| {
        PersistenceError::Other(String::from("cannot mutate an unsaved assignment"))
    })?;

    match mutation {
        AssignmentMutation::Delete { .. } => {
            delete_assignment(conn, original_id)?;
            Ok(Vec::new())
        }
        AssignmentMutation::Truncate { remaining, .. } => {
            update_assignment_range(conn, original_id, *remaining)?;
            Ok(Vec::new())
        }
        AssignmentMutation::Split {
            original,
            left,
            right,
        } => {
            delete_assignment(conn, original_id)?;
            let left: ScheduleAssignment = insert_assignment(conn, &original.remainder(*left))?;
            let right: ScheduleAssignment = insert_assignment(conn, &original.remainder(*right))?;
            Ok(vec![left, right])
        }
    }
}
