// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    Fixture, assign, create_fixture, create_test_actor, create_test_cause, seed_department,
    seed_employee,
};
use crate::{ApiError, BatchCreateRequest, ListSchedulesQuery};

fn batch_request(department_ids: Vec<i64>, shift_id: i64, include_sub: bool) -> BatchCreateRequest {
    BatchCreateRequest {
        department_ids,
        shift_id,
        start_date: String::from("2024-05-01"),
        end_date: String::from("2024-05-31"),
        force: false,
        include_sub_departments: include_sub,
    }
}

#[tokio::test]
async fn test_batch_reports_partial_success() {
    let f: Fixture = create_fixture().await;
    let mut employees: Vec<i64> = vec![f.employee_id];
    for name in ["Brook", "Cyd", "Dana", "Eli"] {
        employees.push(seed_employee(&f.engine, name, f.department_id, true).await);
    }
    assign(&f.engine, employees[1], f.shift_id, "2024-05-10", "2024-05-12").await;
    assign(&f.engine, employees[3], f.shift_id, "2024-04-20", "2024-05-02").await;

    let response = f
        .engine
        .batch_create(
            &batch_request(vec![f.department_id], f.shift_id, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    assert_eq!(response.count, 3);
    let failed: Vec<i64> = response.failures.iter().map(|x| x.employee_id).collect();
    assert_eq!(failed, vec![employees[1], employees[3]]);
    assert!(response.failures[0].reason.contains("Schedule conflict"));

    for (employee_id, start, end) in [
        (employees[1], "2024-05-10", "2024-05-12"),
        (employees[3], "2024-04-20", "2024-05-02"),
    ] {
        let kept = f
            .engine
            .list_schedules(&ListSchedulesQuery {
                employee_id: Some(employee_id),
                department_id: None,
                include_sub_departments: false,
                start_date: String::from("2024-04-01"),
                end_date: String::from("2024-06-30"),
            })
            .await
            .unwrap();
        let ranges: Vec<(&str, &str)> = kept
            .assignments
            .iter()
            .map(|a| (a.start_date.as_str(), a.end_date.as_str()))
            .collect();
        assert_eq!(ranges, vec![(start, end)]);
    }
}

#[tokio::test]
async fn test_batch_reports_inactive_members() {
    let f: Fixture = create_fixture().await;
    let retired: i64 = seed_employee(&f.engine, "Grace", f.department_id, false).await;

    let response = f
        .engine
        .batch_create(
            &batch_request(vec![f.department_id], f.shift_id, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();

    assert_eq!(response.count, 1);
    assert_eq!(response.failures.len(), 1);
    assert_eq!(response.failures[0].employee_id, retired);
}

#[tokio::test]
async fn test_batch_includes_sub_departments_on_request() {
    let f: Fixture = create_fixture().await;
    let child: i64 = seed_department(&f.engine, "Night desk", Some(f.department_id)).await;
    let grandchild: i64 = seed_department(&f.engine, "Relief", Some(child)).await;
    seed_employee(&f.engine, "Brook", child, true).await;
    seed_employee(&f.engine, "Cyd", grandchild, true).await;

    let flat = f
        .engine
        .batch_create(
            &batch_request(vec![f.department_id], f.shift_id, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await
        .unwrap();
    assert_eq!(flat.count, 1);

    let mut nested = batch_request(vec![f.department_id], f.shift_id, true);
    nested.force = true;
    let response = f
        .engine
        .batch_create(&nested, create_test_actor(), create_test_cause())
        .await
        .unwrap();
    assert_eq!(response.count, 3);
    assert!(response.failures.is_empty());

    let listed = f
        .engine
        .list_schedules(&ListSchedulesQuery {
            employee_id: None,
            department_id: Some(f.department_id),
            include_sub_departments: true,
            start_date: String::from("2024-05-01"),
            end_date: String::from("2024-05-31"),
        })
        .await
        .unwrap();
    assert_eq!(listed.assignments.len(), 3);
}

#[tokio::test]
async fn test_batch_rejects_invalid_requests() {
    let f: Fixture = create_fixture().await;

    let empty = f
        .engine
        .batch_create(
            &batch_request(Vec::new(), f.shift_id, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(empty, Err(ApiError::InvalidInput { .. })));

    let unknown_department = f
        .engine
        .batch_create(
            &batch_request(vec![f.department_id, 4_242], f.shift_id, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(
        unknown_department,
        Err(ApiError::ResourceNotFound { .. })
    ));

    let unknown_shift = f
        .engine
        .batch_create(
            &batch_request(vec![f.department_id], 4_242, false),
            create_test_actor(),
            create_test_cause(),
        )
        .await;
    assert!(matches!(
        unknown_shift,
        Err(ApiError::ResourceNotFound { .. })
    ));
}
