// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_domain::parse_date;

use crate::tests::helpers::{Fixture, assign, create_fixture, create_test_actor, create_test_cause};
use crate::{
    ApiError, ClockRecordRequest, CorrectionRequest, DailyRecordsQuery, LeaveRequest,
    UpdateSettingsRequest,
};

async fn clock(f: &Fixture, at: &str, clock_type: &str) {
    f.engine
        .record_clock(&ClockRecordRequest {
            employee_id: f.employee_id,
            clock_time: at.to_string(),
            clock_type: clock_type.to_string(),
            source: None,
        })
        .await
        .unwrap();
}

async fn scheduled_fixture() -> Fixture {
    let f: Fixture = create_fixture().await;
    assign(&f.engine, f.employee_id, f.shift_id, "2024-03-04", "2024-03-31").await;
    f
}

#[tokio::test]
async fn test_on_time_day_is_normal() {
    let f: Fixture = scheduled_fixture().await;
    clock(&f, "2024-03-04T08:55:00", "sign_in").await;
    clock(&f, "2024-03-04T17:05:00", "sign_out").await;

    let record = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-04").unwrap())
        .await
        .unwrap();

    assert_eq!(record.status.as_deref(), Some("normal"));
    assert_eq!(record.check_in.as_deref(), Some("2024-03-04T08:55:00"));
    assert_eq!(record.check_out.as_deref(), Some("2024-03-04T17:05:00"));
    assert_eq!(record.late_minutes, 0);
    assert_eq!(record.expected_periods.len(), 1);
}

#[tokio::test]
async fn test_late_arrival_beyond_grace() {
    let f: Fixture = scheduled_fixture().await;
    clock(&f, "2024-03-05T09:20:00", "sign_in").await;
    clock(&f, "2024-03-05T17:00:00", "sign_out").await;

    let record = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-05").unwrap())
        .await
        .unwrap();

    assert_eq!(record.status.as_deref(), Some("late"));
    assert_eq!(record.late_minutes, 20);
}

#[tokio::test]
async fn test_rest_day_and_unassigned_day_have_no_status() {
    let f: Fixture = scheduled_fixture().await;

    let rest = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-09").unwrap())
        .await
        .unwrap();
    assert!(rest.status.is_none());
    assert!(rest.assignment_id.is_some());
    assert!(rest.expected_periods.is_empty());

    let unassigned = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-01").unwrap())
        .await
        .unwrap();
    assert!(unassigned.status.is_none());
    assert!(unassigned.assignment_id.is_none());
}

#[tokio::test]
async fn test_approved_leave_takes_precedence_over_clocks() {
    let f: Fixture = scheduled_fixture().await;
    clock(&f, "2024-03-06T09:40:00", "sign_in").await;
    f.engine
        .record_leave(&LeaveRequest {
            employee_id: f.employee_id,
            category: String::from("business_trip"),
            start: String::from("2024-03-06T00:00:00"),
            end: String::from("2024-03-07T00:00:00"),
            approved: true,
        })
        .await
        .unwrap();

    let record = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-06").unwrap())
        .await
        .unwrap();

    assert_eq!(record.status.as_deref(), Some("business_trip"));
    assert_eq!(record.late_minutes, 0);
}

#[tokio::test]
async fn test_unapproved_leave_is_ignored() {
    let f: Fixture = scheduled_fixture().await;
    f.engine
        .record_leave(&LeaveRequest {
            employee_id: f.employee_id,
            category: String::from("sick"),
            start: String::from("2024-03-07T00:00:00"),
            end: String::from("2024-03-08T00:00:00"),
            approved: false,
        })
        .await
        .unwrap();

    let record = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-07").unwrap())
        .await
        .unwrap();

    assert_eq!(record.status.as_deref(), Some("absent"));
}

#[tokio::test]
async fn test_approved_correction_recalculates_the_day() {
    let f: Fixture = scheduled_fixture().await;
    clock(&f, "2024-03-04T17:02:00", "sign_out").await;

    let before = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-04").unwrap())
        .await
        .unwrap();
    assert_eq!(before.status.as_deref(), Some("absent"));

    let response = f
        .engine
        .submit_correction(
            &CorrectionRequest {
                employee_id: f.employee_id,
                work_date: String::from("2024-03-04"),
                clock_type: String::from("sign_in"),
                clock_time: String::from("2024-03-04T08:58:00"),
                reason: String::from("Badge reader offline"),
                approved: true,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    assert!(response.correction.clock_record_id.is_some());
    let record = response.daily_record.unwrap();
    assert_eq!(record.status.as_deref(), Some("normal"));
    assert_eq!(record.record_id, before.record_id);
}

#[tokio::test]
async fn test_correction_outside_its_work_date_is_rejected() {
    let f: Fixture = scheduled_fixture().await;

    let result = f
        .engine
        .submit_correction(
            &CorrectionRequest {
                employee_id: f.employee_id,
                work_date: String::from("2024-03-04"),
                clock_type: String::from("sign_in"),
                clock_time: String::from("2024-03-11T08:58:00"),
                reason: String::from("Badge reader offline"),
                approved: true,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));

    // Nothing was stored, so the day the clock would have landed on is untouched.
    let landed = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-11").unwrap())
        .await
        .unwrap();
    assert_eq!(landed.status.as_deref(), Some("absent"));
    let events = f.engine.list_audit_events(Some(f.employee_id)).await.unwrap();
    assert!(events.iter().all(|e| e.action_name != "SubmitCorrection"));
}

#[tokio::test]
async fn test_unapproved_correction_does_not_recalculate() {
    let f: Fixture = scheduled_fixture().await;

    let response = f
        .engine
        .submit_correction(
            &CorrectionRequest {
                employee_id: f.employee_id,
                work_date: String::from("2024-03-04"),
                clock_type: String::from("sign_in"),
                clock_time: String::from("2024-03-04T08:58:00"),
                reason: String::from("Forgot badge"),
                approved: false,
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    assert!(response.daily_record.is_none());
    assert!(response.correction.clock_record_id.is_none());
}

#[tokio::test]
async fn test_clock_source_correction_is_reserved() {
    let f: Fixture = scheduled_fixture().await;

    let result = f
        .engine
        .record_clock(&ClockRecordRequest {
            employee_id: f.employee_id,
            clock_time: String::from("2024-03-04T09:00:00"),
            clock_type: String::from("sign_in"),
            source: Some(String::from("correction")),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_records_carry_the_settings_version_used() {
    let f: Fixture = scheduled_fixture().await;
    let first = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-04").unwrap())
        .await
        .unwrap();
    assert_eq!(first.settings_version, 0);

    f.engine
        .update_settings(
            &UpdateSettingsRequest {
                day_switch_time: String::from("04:00"),
                auto_calc_time: String::from("05:00"),
                timezone: String::from("Europe/Berlin"),
            },
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    let stored = f
        .engine
        .list_daily_records(&DailyRecordsQuery {
            employee_id: Some(f.employee_id),
            start_date: String::from("2024-03-04"),
            end_date: String::from("2024-03-04"),
            page: None,
            page_size: None,
        })
        .await
        .unwrap();
    assert_eq!(stored.records[0].settings_version, 0);

    let second = f
        .engine
        .recalculate_day(f.employee_id, parse_date("2024-03-04").unwrap())
        .await
        .unwrap();
    assert_eq!(second.settings_version, 1);
}

#[tokio::test]
async fn test_daily_record_paging_validation() {
    let f: Fixture = scheduled_fixture().await;

    let mut query = DailyRecordsQuery {
        employee_id: None,
        start_date: String::from("2024-03-01"),
        end_date: String::from("2024-03-31"),
        page: Some(0),
        page_size: None,
    };
    assert!(matches!(
        f.engine.list_daily_records(&query).await,
        Err(ApiError::InvalidInput { .. })
    ));

    query.page = Some(1);
    query.page_size = Some(10_000);
    assert!(matches!(
        f.engine.list_daily_records(&query).await,
        Err(ApiError::InvalidInput { .. })
    ));

    query.page_size = None;
    let empty = f.engine.list_daily_records(&query).await.unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.page_size, 50);
}
