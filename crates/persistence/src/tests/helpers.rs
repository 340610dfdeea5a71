// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork::{
    CatalogCommand, Command, EmployeeSchedule, TransitionResult, apply, apply_catalog,
};
use clockwork_audit::{Actor, Cause};
use clockwork_domain::{
    ClockWindow, DateRange, Employee, PeriodKind, ScheduleAssignment, Shift, TimePeriod,
    parse_date,
};
use time::macros::time;

use crate::{CatalogOutcome, Persistence};

pub fn create_test_actor() -> Actor {
    Actor::api("planner-1")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-789"), String::from("Test request"))
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(parse_date(start).unwrap(), parse_date(end).unwrap()).unwrap()
}

pub fn day_period() -> TimePeriod {
    TimePeriod::new(
        "Day",
        PeriodKind::Fixed,
        time!(09:00),
        time!(17:00),
        ClockWindow::new(time!(08:00), time!(10:00)),
        ClockWindow::new(time!(16:00), time!(19:00)),
    )
    .with_rest(Some(ClockWindow::new(time!(12:00), time!(13:00))))
    .with_grace(5, 10)
}

fn catalog(persistence: &mut Persistence, command: CatalogCommand) -> CatalogOutcome {
    let result = apply_catalog(command, create_test_actor(), create_test_cause()).unwrap();
    persistence.persist_catalog(&result).unwrap().outcome
}

pub fn seed_period(persistence: &mut Persistence, period: TimePeriod) -> TimePeriod {
    match catalog(persistence, CatalogCommand::CreateTimePeriod { period }) {
        CatalogOutcome::TimePeriod(p) => p,
        other => panic!("unexpected outcome {other:?}"),
    }
}

/// Stores a seven-day shift working positions 1 to 5 with `period_id`.
pub fn seed_week_shift(persistence: &mut Persistence, period_id: i64) -> Shift {
    let known_periods: Vec<TimePeriod> = persistence.list_time_periods(true).unwrap();
    let entries: Vec<(u16, Vec<i64>)> = (1..=5).map(|d| (d, vec![period_id])).collect();
    let shift: Shift = Shift::from_positions("Office week", 7, &entries).unwrap();
    match catalog(
        persistence,
        CatalogCommand::CreateShift {
            shift,
            known_periods,
        },
    ) {
        CatalogOutcome::Shift(s) => s,
        other => panic!("unexpected outcome {other:?}"),
    }
}

pub fn seed_department(persistence: &mut Persistence, name: &str, parent_id: Option<i64>) -> i64 {
    match catalog(
        persistence,
        CatalogCommand::CreateDepartment {
            name: name.to_string(),
            parent_id,
        },
    ) {
        CatalogOutcome::Department(d) => d.department_id,
        other => panic!("unexpected outcome {other:?}"),
    }
}

pub fn seed_employee(persistence: &mut Persistence, name: &str, department_id: i64) -> Employee {
    match catalog(
        persistence,
        CatalogCommand::CreateEmployee {
            name: name.to_string(),
            department_id,
            active: true,
        },
    ) {
        CatalogOutcome::Employee(e) => e,
        other => panic!("unexpected outcome {other:?}"),
    }
}

/// A database holding one department, one employee, one period and one shift.
pub struct Seeded {
    pub persistence: Persistence,
    pub employee_id: i64,
    pub shift_id: i64,
}

pub fn seeded() -> Seeded {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let department_id: i64 = seed_department(&mut persistence, "Operations", None);
    let employee: Employee = seed_employee(&mut persistence, "Ada", department_id);
    let period: TimePeriod = seed_period(&mut persistence, day_period());
    let shift: Shift = seed_week_shift(&mut persistence, period.period_id().unwrap());
    Seeded {
        persistence,
        employee_id: employee.employee_id,
        shift_id: shift.shift_id().unwrap(),
    }
}

/// Runs the create command against the stored schedule and persists it.
pub fn schedule(
    persistence: &mut Persistence,
    employee_id: i64,
    shift_id: i64,
    dates: DateRange,
    force: bool,
) -> Result<crate::PersistTransitionResult, String> {
    let existing: Vec<ScheduleAssignment> = persistence
        .list_assignments_for_employee(employee_id, dates)
        .unwrap();
    let state: EmployeeSchedule = EmployeeSchedule::new(employee_id, existing);
    let result: TransitionResult = apply(
        &state,
        Command::CreateAssignment {
            candidate: ScheduleAssignment::new(employee_id, shift_id, dates),
            force,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .map_err(|e| e.to_string())?;
    persistence
        .persist_transition(&result)
        .map_err(|e| e.to_string())
}
