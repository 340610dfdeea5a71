// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use clockwork_audit::{Actor, Cause};
use clockwork_persistence::Persistence;

use crate::{
    CreateAssignmentRequest, CreateAssignmentResponse, CreateDepartmentRequest,
    CreateEmployeeRequest, CreateShiftRequest, Engine, EngineConfig, ShiftDayInfo,
    TimePeriodRequest,
};

pub fn create_test_actor() -> Actor {
    Actor::api("planner-1")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_engine() -> Engine {
    Engine::new(
        Persistence::new_in_memory().unwrap(),
        EngineConfig::default(),
    )
}

/// 09:00 to 17:00 with a lunch break, 5 minutes late grace and 10 minutes
/// early-leave grace.
pub fn day_period_request() -> TimePeriodRequest {
    TimePeriodRequest {
        name: String::from("Day"),
        kind: String::from("fixed"),
        start_time: String::from("09:00"),
        end_time: String::from("17:00"),
        rest_start: Some(String::from("12:00")),
        rest_end: Some(String::from("13:00")),
        check_in_start: String::from("08:00"),
        check_in_end: String::from("10:00"),
        check_out_start: String::from("16:00"),
        check_out_end: String::from("19:00"),
        late_grace_minutes: 5,
        early_leave_grace_minutes: 10,
    }
}

pub async fn seed_department(engine: &Engine, name: &str, parent_id: Option<i64>) -> i64 {
    engine
        .create_department(
            &CreateDepartmentRequest {
                name: name.to_string(),
                parent_id,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap()
        .department
        .department_id
}

pub async fn seed_employee(engine: &Engine, name: &str, department_id: i64, active: bool) -> i64 {
    engine
        .create_employee(
            &CreateEmployeeRequest {
                name: name.to_string(),
                department_id,
                active,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap()
        .employee
        .employee_id
}

pub async fn seed_day_period(engine: &Engine) -> i64 {
    engine
        .create_time_period(&day_period_request(), create_test_actor(), create_test_cause())
        .await
        .unwrap()
        .time_period
        .period_id
}

/// A seven-day cycle working positions 1 to 5.
pub async fn seed_week_shift(engine: &Engine, period_id: i64) -> i64 {
    engine
        .create_shift(
            &CreateShiftRequest {
                name: String::from("Office week"),
                cycle_days: 7,
                days: (1..=5)
                    .map(|day_of_cycle| ShiftDayInfo {
                        day_of_cycle,
                        period_ids: vec![period_id],
                    })
                    .collect(),
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap()
        .shift
        .shift_id
}

/// A department with one active employee on the standard week shift.
pub struct Fixture {
    pub engine: Engine,
    pub department_id: i64,
    pub employee_id: i64,
    pub period_id: i64,
    pub shift_id: i64,
}

pub async fn create_fixture() -> Fixture {
    let engine: Engine = create_test_engine();
    let department_id: i64 = seed_department(&engine, "Operations", None).await;
    let employee_id: i64 = seed_employee(&engine, "Ada", department_id, true).await;
    let period_id: i64 = seed_day_period(&engine).await;
    let shift_id: i64 = seed_week_shift(&engine, period_id).await;
    Fixture {
        engine,
        department_id,
        employee_id,
        period_id,
        shift_id,
    }
}

pub fn assignment_request(
    employee_id: i64,
    shift_id: i64,
    start: &str,
    end: &str,
    force: bool,
) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        employee_id,
        shift_id,
        start_date: start.to_string(),
        end_date: end.to_string(),
        force,
    }
}

pub async fn assign(
    engine: &Engine,
    employee_id: i64,
    shift_id: i64,
    start: &str,
    end: &str,
) -> CreateAssignmentResponse {
    engine
        .create_assignment(
            &assignment_request(employee_id, shift_id, start, end, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap()
}
