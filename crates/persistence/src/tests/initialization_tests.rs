// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use crate::tests::helpers::{seed_department, seed_employee};

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = Persistence::new_in_memory().unwrap();
    let mut second = Persistence::new_in_memory().unwrap();

    seed_department(&mut first, "Operations", None);

    assert_eq!(first.list_departments().unwrap().len(), 1);
    assert!(second.list_departments().unwrap().is_empty());
}

#[test]
fn test_employee_requires_existing_department() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let department_id = seed_department(&mut persistence, "Operations", None);
    let employee = seed_employee(&mut persistence, "Ada", department_id);

    assert_eq!(
        persistence.get_employee(employee.employee_id).unwrap(),
        Some(employee)
    );
    assert_eq!(persistence.list_active_employee_ids().unwrap().len(), 1);
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "clockwork_reopen_{}.sqlite",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        seed_department(&mut persistence, "Operations", None);
    }
    let mut reopened = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.list_departments().unwrap().len(), 1);

    drop(reopened);
    let _ = std::fs::remove_file(&path);
}
