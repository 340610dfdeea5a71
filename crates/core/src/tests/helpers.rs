// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_audit::{Actor, Cause};
use clockwork_domain::{
    ClockWindow, DateRange, PeriodKind, ScheduleAssignment, TimePeriod, parse_date,
};
use time::macros::time;

pub fn create_test_actor() -> Actor {
    Actor::api("planner-1")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Planner request"))
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(parse_date(start).unwrap(), parse_date(end).unwrap()).unwrap()
}

pub fn stored_assignment(id: i64, employee_id: i64, start: &str, end: &str) -> ScheduleAssignment {
    let dates: DateRange = range(start, end);
    ScheduleAssignment::with_id(id, employee_id, 100, dates, dates.start(), None)
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
}
