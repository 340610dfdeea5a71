// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Departments, employees, and batch target selection.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A node in the department tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// A person who can be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub name: String,
    pub department_id: i64,
    pub active: bool,
}

/// Validates a department or employee name.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` when the trimmed name is empty.
pub fn validate_name(kind: &str, name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(format!(
            "{kind} name cannot be empty"
        )));
    }
    Ok(())
}

/// Expands root departments to the set of departments whose members are targeted.
///
/// With `include_descendants`, every department below a root is added. Cycles
/// in the parent links are tolerated: each department is visited once.
#[must_use]
pub fn expand_departments(
    roots: &[i64],
    departments: &[Department],
    include_descendants: bool,
) -> BTreeSet<i64> {
    let mut selected: BTreeSet<i64> = roots.iter().copied().collect();
    if !include_descendants {
        return selected;
    }

    let mut children: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for department in departments {
        if let Some(parent) = department.parent_id {
            children
                .entry(parent)
                .or_default()
                .push(department.department_id);
        }
    }

    let mut queue: VecDeque<i64> = roots.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        for child in children.get(&current).into_iter().flatten() {
            if selected.insert(*child) {
                queue.push_back(*child);
            }
        }
    }

    selected
}

/// Outcome of choosing the employees a batch applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchTargets {
    /// Active employees, deduplicated, in ascending id order.
    pub employee_ids: Vec<i64>,
    /// Employees that cannot be scheduled, with the reason.
    pub rejected: Vec<(i64, String)>,
}

/// Selects the members of `department_ids`, rejecting inactive employees.
#[must_use]
pub fn select_batch_targets(department_ids: &BTreeSet<i64>, employees: &[Employee]) -> BatchTargets {
    let mut active: BTreeSet<i64> = BTreeSet::new();
    let mut inactive: BTreeSet<i64> = BTreeSet::new();

    for employee in employees
        .iter()
        .filter(|e| department_ids.contains(&e.department_id))
    {
        if employee.active {
            active.insert(employee.employee_id);
        } else {
            inactive.insert(employee.employee_id);
        }
    }

    BatchTargets {
        employee_ids: active.into_iter().collect(),
        rejected: inactive
            .into_iter()
            .map(|id| (id, DomainError::EmployeeInactive(id).to_string()))
            .collect(),
    }
}
