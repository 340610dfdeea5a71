// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_domain::{
    AttendanceStatus, ClockSource, ClockType, DailyRecord, LeaveCategory, LeaveRecord, parse_date,
};
use time::macros::datetime;

use crate::tests::helpers::{range, seeded};

fn absent_record(employee_id: i64, day: &str) -> DailyRecord {
    DailyRecord {
        status: Some(AttendanceStatus::Absent),
        ..DailyRecord::rest_day(employee_id, parse_date(day).unwrap(), None, None, 0)
    }
}

#[test]
fn test_clock_records_are_listed_in_half_open_range() {
    let mut s = seeded();
    for at in [
        datetime!(2024-03-04 08:55:00),
        datetime!(2024-03-04 17:05:00),
        datetime!(2024-03-05 00:00:00),
    ] {
        s.persistence
            .insert_clock_record(s.employee_id, at, ClockType::SignIn, ClockSource::Device)
            .unwrap();
    }

    let listed = s
        .persistence
        .list_clock_records(
            s.employee_id,
            datetime!(2024-03-04 00:00:00),
            datetime!(2024-03-05 00:00:00),
        )
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed[0].clock_time < listed[1].clock_time);
}

#[test]
fn test_only_approved_overlapping_leave_is_listed() {
    let mut s = seeded();
    let leave = LeaveRecord {
        leave_id: 0,
        employee_id: s.employee_id,
        category: LeaveCategory::Annual,
        start: datetime!(2024-03-04 00:00:00),
        end: datetime!(2024-03-06 00:00:00),
        approved: true,
    };
    s.persistence.insert_leave(&leave).unwrap();
    s.persistence
        .insert_leave(&LeaveRecord {
            approved: false,
            ..leave.clone()
        })
        .unwrap();

    let inside = s
        .persistence
        .list_approved_leaves(
            s.employee_id,
            datetime!(2024-03-05 00:00:00),
            datetime!(2024-03-06 00:00:00),
        )
        .unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].category, LeaveCategory::Annual);

    let after = s
        .persistence
        .list_approved_leaves(
            s.employee_id,
            datetime!(2024-03-06 00:00:00),
            datetime!(2024-03-07 00:00:00),
        )
        .unwrap();
    assert!(after.is_empty());
}

#[test]
fn test_upsert_overwrites_in_place() {
    let mut s = seeded();
    let first: i64 = s
        .persistence
        .upsert_daily_record(&absent_record(s.employee_id, "2024-03-04"))
        .unwrap();

    let mut corrected: DailyRecord = absent_record(s.employee_id, "2024-03-04");
    corrected.status = Some(AttendanceStatus::Late);
    corrected.late_minutes = 12;
    corrected.check_in = Some(datetime!(2024-03-04 09:12:00));
    let second: i64 = s.persistence.upsert_daily_record(&corrected).unwrap();

    assert_eq!(first, second);
    let stored = s
        .persistence
        .get_daily_record(s.employee_id, parse_date("2024-03-04").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.record_id, first);
    assert_eq!(stored.record, corrected);
    assert!(stored.calculated_at.is_some());
}

#[test]
fn test_daily_records_are_paginated() {
    let mut s = seeded();
    for day in ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04", "2024-03-05"] {
        s.persistence
            .upsert_daily_record(&absent_record(s.employee_id, day))
            .unwrap();
    }

    let page = s
        .persistence
        .list_daily_records(Some(s.employee_id), range("2024-03-02", "2024-03-05"), 2, 3)
        .unwrap();

    assert_eq!(page.total, 4);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].record.work_date, parse_date("2024-03-05").unwrap());

    let other = s
        .persistence
        .list_daily_records(Some(s.employee_id + 1), range("2024-03-01", "2024-03-05"), 1, 10)
        .unwrap();
    assert_eq!(other.total, 0);
}
