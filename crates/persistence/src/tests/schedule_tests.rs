// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork::{Command, EmployeeSchedule, apply};
use clockwork_domain::{ScheduleAssignment, format_date, parse_date};

use crate::PersistenceError;
use crate::tests::helpers::{
    Seeded, create_test_actor, create_test_cause, range, schedule, seeded,
};

fn stored_ranges(seeded: &mut Seeded) -> Vec<(String, String)> {
    seeded
        .persistence
        .list_assignments_for_employee(seeded.employee_id, range("2000-01-01", "2100-12-31"))
        .unwrap()
        .iter()
        .map(|a| (format_date(a.start_date()), format_date(a.end_date())))
        .collect()
}

#[test]
fn test_create_assignment_is_stored_with_audit_event() {
    let mut s = seeded();
    let result = schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-01", "2024-01-10"),
        false,
    )
    .unwrap();

    let created: ScheduleAssignment = result.created.unwrap();
    assert!(created.assignment_id().is_some());
    assert!(created.created_at().is_some());

    let event = s.persistence.get_audit_event(result.event_id).unwrap();
    assert_eq!(event.action.name, "CreateAssignment");
    assert_eq!(event.employee_id, Some(s.employee_id));
}

#[test]
fn test_non_force_conflict_leaves_existing_assignment_intact() {
    let mut s = seeded();
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-01", "2024-01-10"),
        false,
    )
    .unwrap();

    let err = schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-05", "2024-01-15"),
        false,
    )
    .unwrap_err();

    assert!(err.contains("overlapping"));
    assert_eq!(
        stored_ranges(&mut s),
        vec![(String::from("2024-01-01"), String::from("2024-01-10"))]
    );
}

#[test]
fn test_force_split_stores_both_remainders() {
    let mut s = seeded();
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-01", "2024-01-10"),
        false,
    )
    .unwrap();

    let result = schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-05", "2024-01-06"),
        true,
    )
    .unwrap();

    assert_eq!(result.remainders.len(), 2);
    assert_eq!(
        stored_ranges(&mut s),
        vec![
            (String::from("2024-01-01"), String::from("2024-01-04")),
            (String::from("2024-01-05"), String::from("2024-01-06")),
            (String::from("2024-01-07"), String::from("2024-01-10")),
        ]
    );
}

#[test]
fn test_force_truncates_and_deletes() {
    let mut s = seeded();
    for (start, end) in [("2024-01-01", "2024-01-10"), ("2024-01-11", "2024-01-12")] {
        schedule(
            &mut s.persistence,
            s.employee_id,
            s.shift_id,
            range(start, end),
            false,
        )
        .unwrap();
    }

    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-08", "2024-01-20"),
        true,
    )
    .unwrap();

    assert_eq!(
        stored_ranges(&mut s),
        vec![
            (String::from("2024-01-01"), String::from("2024-01-07")),
            (String::from("2024-01-08"), String::from("2024-01-20")),
        ]
    );
}

#[test]
fn test_cycle_anchor_survives_split_and_start_truncation() {
    let mut s = seeded();
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-03-04", "2024-03-31"),
        false,
    )
    .unwrap();
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-03-06", "2024-03-06"),
        true,
    )
    .unwrap();
    // Cuts the start off the right remainder.
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-03-07", "2024-03-09"),
        true,
    )
    .unwrap();

    let anchors: Vec<(String, String)> = s
        .persistence
        .list_assignments_for_employee(s.employee_id, range("2024-03-01", "2024-03-31"))
        .unwrap()
        .iter()
        .map(|a| (format_date(a.start_date()), format_date(a.cycle_anchor())))
        .collect();
    assert_eq!(
        anchors,
        vec![
            (String::from("2024-03-04"), String::from("2024-03-04")),
            (String::from("2024-03-06"), String::from("2024-03-06")),
            (String::from("2024-03-07"), String::from("2024-03-07")),
            (String::from("2024-03-10"), String::from("2024-03-04")),
        ]
    );
}

#[test]
fn test_stale_plan_is_rolled_back() {
    let mut s = seeded();
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-01", "2024-01-10"),
        false,
    )
    .unwrap();

    // A plan computed against an empty schedule must not commit.
    let state = EmployeeSchedule::new(s.employee_id, Vec::new());
    let result = apply(
        &state,
        Command::CreateAssignment {
            candidate: ScheduleAssignment::new(
                s.employee_id,
                s.shift_id,
                range("2024-01-05", "2024-01-06"),
            ),
            force: false,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    let err = s.persistence.persist_transition(&result).unwrap_err();
    assert_eq!(
        err,
        PersistenceError::OverlapDetected {
            employee_id: s.employee_id
        }
    );
    assert_eq!(stored_ranges(&mut s).len(), 1);
    assert_eq!(s.persistence.list_audit_events(Some(s.employee_id)).unwrap().len(), 1);
}

#[test]
fn test_delete_assignment() {
    let mut s = seeded();
    let created = schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-01-01", "2024-01-10"),
        false,
    )
    .unwrap()
    .created
    .unwrap();
    let assignment_id: i64 = created.assignment_id().unwrap();

    let state = EmployeeSchedule::new(s.employee_id, vec![created]);
    let result = apply(
        &state,
        Command::DeleteAssignment { assignment_id },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    s.persistence.persist_transition(&result).unwrap();

    assert!(s.persistence.get_assignment(assignment_id).unwrap().is_none());

    // Replaying the same deletion finds nothing to delete.
    let err = s.persistence.persist_transition(&result).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_assignment_covering_and_department_listing() {
    let mut s = seeded();
    schedule(
        &mut s.persistence,
        s.employee_id,
        s.shift_id,
        range("2024-02-01", "2024-02-29"),
        false,
    )
    .unwrap();

    let covering = s
        .persistence
        .assignment_covering(s.employee_id, parse_date("2024-02-29").unwrap())
        .unwrap();
    assert!(covering.is_some());
    let outside = s
        .persistence
        .assignment_covering(s.employee_id, parse_date("2024-03-01").unwrap())
        .unwrap();
    assert!(outside.is_none());

    let employee = s.persistence.get_employee(s.employee_id).unwrap().unwrap();
    let listed = s
        .persistence
        .list_assignments_for_departments(&[employee.department_id], range("2024-02-10", "2024-02-11"))
        .unwrap();
    assert_eq!(listed.len(), 1);
}
