// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_actor, create_test_cause, day_period};
use crate::{CatalogChange, CatalogCommand, CatalogResult, CoreError, apply_catalog};
use clockwork_domain::{
    AttendanceSettings, ClockType, CorrectionRecord, DomainError, Shift, TimePeriod,
};
use time::macros::{date, datetime, time};

#[test]
fn test_create_time_period_validates_and_audits() {
    let result: CatalogResult = apply_catalog(
        CatalogCommand::CreateTimePeriod {
            period: day_period(),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert!(matches!(result.change, CatalogChange::TimePeriod(_)));
    assert_eq!(result.audit_event.action.name, "CreateTimePeriod");
    assert_eq!(result.audit_event.employee_id, None);
}

#[test]
fn test_create_shift_rejects_unknown_period() {
    let known: TimePeriod = day_period().with_id(1);
    let shift: Shift = Shift::new("Two on", 2, vec![vec![1], vec![2]]).unwrap();

    let result = apply_catalog(
        CatalogCommand::CreateShift {
            shift,
            known_periods: vec![known],
        },
        create_test_actor(),
        create_test_cause(),
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::TimePeriodNotFound(2))
    );
}

#[test]
fn test_create_shift_rejects_replaced_period() {
    let retired: TimePeriod = day_period().with_id(1).with_replaced_by(Some(5));
    let shift: Shift = Shift::new("Daily", 1, vec![vec![1]]).unwrap();

    let result = apply_catalog(
        CatalogCommand::CreateShift {
            shift,
            known_periods: vec![retired],
        },
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidShift { .. }))
    ));
}

#[test]
fn test_replace_time_period_collects_referencing_shifts() {
    let original: TimePeriod = day_period().with_id(1);
    let replacement: TimePeriod = day_period().with_grace(10, 0);
    let shifts: Vec<Shift> = vec![
        Shift::new("Uses it", 1, vec![vec![1]]).unwrap().with_id(10),
        Shift::new("Does not", 1, vec![vec![2]]).unwrap().with_id(11),
    ];

    let result: CatalogResult = apply_catalog(
        CatalogCommand::ReplaceTimePeriod {
            original,
            replacement,
            shifts,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    let CatalogChange::Replacement {
        original_id,
        shift_ids,
        ..
    } = result.change
    else {
        panic!("expected replacement");
    };
    assert_eq!(original_id, 1);
    assert_eq!(shift_ids, vec![10]);
}

#[test]
fn test_replace_twice_is_rejected() {
    let original: TimePeriod = day_period().with_id(1).with_replaced_by(Some(2));
    let result = apply_catalog(
        CatalogCommand::ReplaceTimePeriod {
            original,
            replacement: day_period(),
            shifts: Vec::new(),
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(result.is_err());
}

#[test]
fn test_update_settings_bumps_version() {
    let current: AttendanceSettings = AttendanceSettings {
        version: 3,
        ..AttendanceSettings::default()
    };
    let requested: AttendanceSettings = AttendanceSettings {
        version: 0,
        day_switch_time: time!(04:00),
        auto_calc_time: time!(05:00),
        timezone: String::from("Europe/Berlin"),
    };

    let result: CatalogResult = apply_catalog(
        CatalogCommand::UpdateSettings { current, requested },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    let CatalogChange::Settings(next) = result.change else {
        panic!("expected settings");
    };
    assert_eq!(next.version, 4);
    assert_eq!(next.timezone, "Europe/Berlin");
    assert!(result.audit_event.after.data.contains("version=4"));
}

#[test]
fn test_update_settings_rejects_unknown_timezone() {
    let requested: AttendanceSettings = AttendanceSettings {
        timezone: String::from("Atlantis/Capital"),
        ..AttendanceSettings::default()
    };
    let result = apply_catalog(
        CatalogCommand::UpdateSettings {
            current: AttendanceSettings::default(),
            requested,
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidTimezone(_)))
    ));
}

#[test]
fn test_correction_requires_reason() {
    let correction: CorrectionRecord = CorrectionRecord {
        correction_id: 0,
        employee_id: 7,
        work_date: date!(2024 - 03 - 01),
        clock_type: ClockType::SignIn,
        clock_time: datetime!(2024-03-01 09:00),
        reason: String::from("  "),
        approved: true,
        clock_record_id: None,
    };
    let result = apply_catalog(
        CatalogCommand::SubmitCorrection {
            correction,
            settings: AttendanceSettings::default(),
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidRecord { .. }))
    ));
}

#[test]
fn test_correction_rejects_clock_outside_work_date() {
    let correction: CorrectionRecord = CorrectionRecord {
        correction_id: 0,
        employee_id: 7,
        work_date: date!(2024 - 03 - 04),
        clock_type: ClockType::SignIn,
        clock_time: datetime!(2024-03-11 08:58),
        reason: String::from("badge reader offline"),
        approved: true,
        clock_record_id: None,
    };
    let result = apply_catalog(
        CatalogCommand::SubmitCorrection {
            correction,
            settings: AttendanceSettings::default(),
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidRecord { .. }))
    ));
}

#[test]
fn test_create_employee_trims_name() {
    let result: CatalogResult = apply_catalog(
        CatalogCommand::CreateEmployee {
            name: String::from("  Ada  "),
            department_id: 1,
            active: true,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    assert!(matches!(
        result.change,
        CatalogChange::Employee { ref name, .. } if name == "Ada"
    ));
}
