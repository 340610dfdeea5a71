// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    Fixture, create_fixture, create_test_actor, create_test_cause, day_period_request,
};
use crate::{
    ApiError, CreateDepartmentRequest, CreateEmployeeRequest, CreateShiftRequest, ShiftDayInfo,
    TimePeriodRequest, UpdateSettingsRequest,
};

fn late_period_request() -> TimePeriodRequest {
    TimePeriodRequest {
        name: String::from("Late day"),
        start_time: String::from("10:00"),
        end_time: String::from("18:00"),
        check_in_start: String::from("09:00"),
        check_in_end: String::from("11:00"),
        check_out_start: String::from("17:00"),
        check_out_end: String::from("20:00"),
        ..day_period_request()
    }
}

#[tokio::test]
async fn test_replacing_a_period_repoints_shifts() {
    let f: Fixture = create_fixture().await;

    let response = f
        .engine
        .replace_time_period(
            f.period_id,
            &late_period_request(),
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    assert_eq!(response.replaced_period_id, f.period_id);
    assert_eq!(response.repointed_positions, 5);
    assert_eq!(response.replacement.start_time, "10:00:00");

    let shifts = f.engine.list_shifts().await.unwrap();
    assert!(
        shifts[0]
            .days
            .iter()
            .flat_map(|d| d.period_ids.iter())
            .all(|id| *id == response.replacement.period_id)
    );

    let current = f.engine.list_time_periods(false).await.unwrap();
    assert_eq!(current.len(), 1);
    let all = f.engine.list_time_periods(true).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(
        all.iter()
            .any(|p| p.period_id == f.period_id
                && p.replaced_by == Some(response.replacement.period_id))
    );
}

#[tokio::test]
async fn test_replaced_period_cannot_be_replaced_again() {
    let f: Fixture = create_fixture().await;
    f.engine
        .replace_time_period(
            f.period_id,
            &late_period_request(),
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    let again = f
        .engine
        .replace_time_period(
            f.period_id,
            &late_period_request(),
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(again.is_err());

    let missing = f
        .engine
        .replace_time_period(
            9_999,
            &late_period_request(),
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(missing, Err(ApiError::ResourceNotFound { .. })));
}

#[tokio::test]
async fn test_malformed_period_requests_are_rejected() {
    let f: Fixture = create_fixture().await;

    let mut bad_time = day_period_request();
    bad_time.start_time = String::from("25:00");
    assert!(matches!(
        f.engine
            .create_time_period(&bad_time, create_test_actor(), create_test_cause())
            .await,
        Err(ApiError::InvalidInput { .. })
    ));

    let mut half_rest = day_period_request();
    half_rest.rest_end = None;
    assert!(matches!(
        f.engine
            .create_time_period(&half_rest, create_test_actor(), create_test_cause())
            .await,
        Err(ApiError::InvalidInput { .. })
    ));

    let mut bad_kind = day_period_request();
    bad_kind.kind = String::from("rotating");
    assert!(matches!(
        f.engine
            .create_time_period(&bad_kind, create_test_actor(), create_test_cause())
            .await,
        Err(ApiError::InvalidInput { .. })
    ));
}

#[tokio::test]
async fn test_shift_must_reference_known_periods() {
    let f: Fixture = create_fixture().await;

    let result = f
        .engine
        .create_shift(
            &CreateShiftRequest {
                name: String::from("Ghost"),
                cycle_days: 3,
                days: vec![ShiftDayInfo {
                    day_of_cycle: 1,
                    period_ids: vec![f.period_id, 9_999],
                }],
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(result.is_err());

    let out_of_cycle = f
        .engine
        .create_shift(
            &CreateShiftRequest {
                name: String::from("Short"),
                cycle_days: 3,
                days: vec![ShiftDayInfo {
                    day_of_cycle: 4,
                    period_ids: vec![f.period_id],
                }],
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(out_of_cycle, Err(ApiError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_shift_listing_includes_rest_positions() {
    let f: Fixture = create_fixture().await;

    let shifts = f.engine.list_shifts().await.unwrap();
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].cycle_days, 7);
    assert_eq!(shifts[0].days.len(), 7);
    assert!(shifts[0].days[5].period_ids.is_empty());
    assert_eq!(shifts[0].days[6].day_of_cycle, 7);
}

#[tokio::test]
async fn test_organization_references_must_exist() {
    let f: Fixture = create_fixture().await;

    let orphan = f
        .engine
        .create_department(
            &CreateDepartmentRequest {
                name: String::from("Orphan"),
                parent_id: Some(9_999),
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(orphan, Err(ApiError::ResourceNotFound { .. })));

    let homeless = f
        .engine
        .create_employee(
            &CreateEmployeeRequest {
                name: String::from("Nomad"),
                department_id: 9_999,
                active: true,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(homeless, Err(ApiError::ResourceNotFound { .. })));

    let blank = f
        .engine
        .create_employee(
            &CreateEmployeeRequest {
                name: String::from("   "),
                department_id: f.department_id,
                active: true,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(blank, Err(ApiError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_settings_versions_increase() {
    let f: Fixture = create_fixture().await;
    let initial = f.engine.get_settings().await.unwrap();
    assert_eq!(initial.version, 0);
    assert_eq!(initial.timezone, "UTC");

    let updated = f
        .engine
        .update_settings(
            &UpdateSettingsRequest {
                day_switch_time: String::from("04:00"),
                auto_calc_time: String::from("05:30"),
                timezone: String::from("America/New_York"),
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();
    assert_eq!(updated.settings.version, 1);
    assert_eq!(updated.settings.day_switch_time, "04:00:00");

    let rejected = f
        .engine
        .update_settings(
            &UpdateSettingsRequest {
                day_switch_time: String::from("04:00"),
                auto_calc_time: String::from("05:30"),
                timezone: String::from("Mars/Olympus_Mons"),
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(rejected, Err(ApiError::InvalidInput { .. })));
    assert_eq!(f.engine.get_settings().await.unwrap().version, 1);
}

#[tokio::test]
async fn test_catalog_changes_are_audited() {
    let f: Fixture = create_fixture().await;

    let events = f.engine.list_audit_events(None).await.unwrap();
    let actions: Vec<&str> = events.iter().map(|e| e.action_name.as_str()).collect();

    assert_eq!(
        actions,
        vec![
            "CreateDepartment",
            "CreateEmployee",
            "CreateTimePeriod",
            "CreateShift"
        ]
    );
    assert!(events.iter().all(|e| e.actor_id == "planner-1"));
}
