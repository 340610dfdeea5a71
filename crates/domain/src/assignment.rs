// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedule assignments and conflict resolution planning.
//!
//! An assignment binds one employee to one shift over a closed date range.
//! No two assignments of the same employee may overlap once stored. A new
//! assignment that intersects existing ones is either rejected or, when
//! forced, carved out of them:
//!
//! - an existing assignment entirely inside the candidate is deleted
//! - a candidate strictly inside an existing assignment splits it in two
//! - a single overlapping end is shrunk to abut the candidate

use crate::date_range::DateRange;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::Date;

/// One employee bound to one shift over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    assignment_id: Option<i64>,
    employee_id: i64,
    shift_id: i64,
    range: DateRange,
    /// Date on which cycle position 1 falls. Survives truncation and splits.
    cycle_anchor: Date,
    created_at: Option<String>,
}

impl ScheduleAssignment {
    /// Creates an unpersisted assignment whose cycle starts on its first day.
    #[must_use]
    pub const fn new(employee_id: i64, shift_id: i64, range: DateRange) -> Self {
        Self {
            assignment_id: None,
            employee_id,
            shift_id,
            range,
            cycle_anchor: range.start(),
            created_at: None,
        }
    }

    /// Creates an assignment loaded from storage.
    #[must_use]
    pub const fn with_id(
        assignment_id: i64,
        employee_id: i64,
        shift_id: i64,
        range: DateRange,
        cycle_anchor: Date,
        created_at: Option<String>,
    ) -> Self {
        Self {
            assignment_id: Some(assignment_id),
            employee_id,
            shift_id,
            range,
            cycle_anchor,
            created_at,
        }
    }

    #[must_use]
    pub const fn assignment_id(&self) -> Option<i64> {
        self.assignment_id
    }

    #[must_use]
    pub const fn employee_id(&self) -> i64 {
        self.employee_id
    }

    #[must_use]
    pub const fn shift_id(&self) -> i64 {
        self.shift_id
    }

    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.range.start()
    }

    #[must_use]
    pub const fn end_date(&self) -> Date {
        self.range.end()
    }

    #[must_use]
    pub const fn cycle_anchor(&self) -> Date {
        self.cycle_anchor
    }

    #[must_use]
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Returns a copy carrying the same shift over a different range.
    #[must_use]
    pub fn with_range(&self, range: DateRange) -> Self {
        Self {
            range,
            ..self.clone()
        }
    }

    /// Returns a new unpersisted assignment with the same employee, shift
    /// and cycle anchor, so the rotation continues unchanged over `range`.
    #[must_use]
    pub const fn remainder(&self, range: DateRange) -> Self {
        Self {
            assignment_id: None,
            employee_id: self.employee_id,
            shift_id: self.shift_id,
            range,
            cycle_anchor: self.cycle_anchor,
            created_at: None,
        }
    }
}

/// An existing assignment that intersects a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub assignment_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub overlap_start: Date,
    pub overlap_end: Date,
}

/// A change to an existing assignment made to admit a forced candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentMutation {
    /// The existing assignment lies inside the candidate and is removed.
    Delete {
        /// The removed assignment.
        original: ScheduleAssignment,
    },
    /// One end of the existing assignment overlapped and was shrunk.
    Truncate {
        /// The assignment before the change.
        original: ScheduleAssignment,
        /// The surviving range.
        remaining: DateRange,
    },
    /// The candidate lies strictly inside; the original is removed and two
    /// remainders carrying its shift take its place.
    Split {
        /// The removed assignment.
        original: ScheduleAssignment,
        /// Remainder before the candidate.
        left: DateRange,
        /// Remainder after the candidate.
        right: DateRange,
    },
}

impl AssignmentMutation {
    /// The assignment this mutation changes.
    #[must_use]
    pub const fn original(&self) -> &ScheduleAssignment {
        match self {
            Self::Delete { original }
            | Self::Truncate { original, .. }
            | Self::Split { original, .. } => original,
        }
    }

    /// Short name used in audit records and responses.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Delete { .. } => "delete",
            Self::Truncate { .. } => "truncate",
            Self::Split { .. } => "split",
        }
    }
}

/// The full set of changes needed to store a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPlan {
    /// The assignment to insert.
    pub candidate: ScheduleAssignment,
    /// Changes to existing assignments, in input order.
    pub mutations: Vec<AssignmentMutation>,
}

/// Lists every existing assignment of the candidate's employee that intersects it.
#[must_use]
pub fn find_conflicts(
    candidate: &ScheduleAssignment,
    existing: &[ScheduleAssignment],
) -> Vec<ConflictDetail> {
    existing
        .iter()
        .filter(|e| e.employee_id == candidate.employee_id)
        .filter_map(|e| {
            let overlap: DateRange = e.range.intersection(&candidate.range)?;
            Some(ConflictDetail {
                assignment_id: e.assignment_id.unwrap_or_default(),
                start_date: e.start_date(),
                end_date: e.end_date(),
                overlap_start: overlap.start(),
                overlap_end: overlap.end(),
            })
        })
        .collect()
}

/// Plans the storage of `candidate` against the employee's existing assignments.
///
/// # Errors
///
/// Returns `DomainError::ScheduleConflict` listing every intersecting
/// assignment when `force` is false and any intersection exists.
pub fn plan_resolution(
    candidate: &ScheduleAssignment,
    existing: &[ScheduleAssignment],
    force: bool,
) -> Result<ResolutionPlan, DomainError> {
    let conflicts: Vec<ConflictDetail> = find_conflicts(candidate, existing);

    if !force && !conflicts.is_empty() {
        return Err(DomainError::ScheduleConflict {
            employee_id: candidate.employee_id,
            conflicts,
        });
    }

    let mutations: Vec<AssignmentMutation> = existing
        .iter()
        .filter(|e| e.employee_id == candidate.employee_id && e.range.intersects(&candidate.range))
        .map(|e| match e.range.subtract(&candidate.range) {
            (Some(left), Some(right)) => AssignmentMutation::Split {
                original: e.clone(),
                left,
                right,
            },
            (Some(remaining), None) | (None, Some(remaining)) => AssignmentMutation::Truncate {
                original: e.clone(),
                remaining,
            },
            (None, None) => AssignmentMutation::Delete {
                original: e.clone(),
            },
        })
        .collect();

    Ok(ResolutionPlan {
        candidate: candidate.clone(),
        mutations,
    })
}

/// Verifies that no two assignments of the same employee overlap.
///
/// # Errors
///
/// Returns `DomainError::ScheduleConflict` naming the first overlapping pair found.
pub fn verify_non_overlapping(assignments: &[ScheduleAssignment]) -> Result<(), DomainError> {
    let mut sorted: Vec<&ScheduleAssignment> = assignments.iter().collect();
    sorted.sort_by_key(|a| (a.employee_id, a.start_date()));

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.employee_id != b.employee_id {
            continue;
        }
        if let Some(overlap) = a.range.intersection(&b.range) {
            return Err(DomainError::ScheduleConflict {
                employee_id: a.employee_id,
                conflicts: vec![ConflictDetail {
                    assignment_id: a.assignment_id.unwrap_or_default(),
                    start_date: a.start_date(),
                    end_date: a.end_date(),
                    overlap_start: overlap.start(),
                    overlap_end: overlap.end(),
                }],
            });
        }
    }

    Ok(())
}

/// Returns the assignment covering `day`, if any.
#[must_use]
pub fn active_on(assignments: &[ScheduleAssignment], day: Date) -> Option<&ScheduleAssignment> {
    assignments.iter().find(|a| a.range.contains(day))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::date;

    fn existing(id: i64, start: Date, end: Date) -> ScheduleAssignment {
        ScheduleAssignment::with_id(id, 1, 100, DateRange::new(start, end).unwrap(), start, None)
    }

    fn candidate(start: Date, end: Date) -> ScheduleAssignment {
        ScheduleAssignment::new(1, 200, DateRange::new(start, end).unwrap())
    }

    #[test]
    fn test_non_force_rejects_with_overlap_details() {
        let a = existing(1, date!(2024 - 01 - 01), date!(2024 - 01 - 10));
        let b = candidate(date!(2024 - 01 - 05), date!(2024 - 01 - 15));

        let err = plan_resolution(&b, &[a], false).unwrap_err();
        let DomainError::ScheduleConflict { conflicts, .. } = err else {
            panic!("expected conflict");
        };
        assert_eq!(
            conflicts,
            vec![ConflictDetail {
                assignment_id: 1,
                start_date: date!(2024 - 01 - 01),
                end_date: date!(2024 - 01 - 10),
                overlap_start: date!(2024 - 01 - 05),
                overlap_end: date!(2024 - 01 - 10),
            }]
        );
    }

    #[test]
    fn test_force_splits_when_candidate_strictly_inside() {
        let a = existing(1, date!(2024 - 01 - 01), date!(2024 - 01 - 10));
        let b = candidate(date!(2024 - 01 - 05), date!(2024 - 01 - 06));

        let plan = plan_resolution(&b, &[a.clone()], true).unwrap();
        assert_eq!(
            plan.mutations,
            vec![AssignmentMutation::Split {
                original: a,
                left: DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 04)).unwrap(),
                right: DateRange::new(date!(2024 - 01 - 07), date!(2024 - 01 - 10)).unwrap(),
            }]
        );
    }

    #[test]
    fn test_remainders_keep_the_original_cycle_anchor() {
        let a = existing(1, date!(2024 - 03 - 04), date!(2024 - 03 - 31));
        let right = a.remainder(DateRange::new(date!(2024 - 03 - 07), date!(2024 - 03 - 31)).unwrap());
        let shrunk = a.with_range(DateRange::new(date!(2024 - 03 - 10), date!(2024 - 03 - 31)).unwrap());

        assert_eq!(right.assignment_id(), None);
        assert_eq!(right.cycle_anchor(), date!(2024 - 03 - 04));
        assert_eq!(shrunk.cycle_anchor(), date!(2024 - 03 - 04));
        assert_eq!(candidate(date!(2024 - 03 - 06), date!(2024 - 03 - 06)).cycle_anchor(), date!(2024 - 03 - 06));
    }

    #[test]
    fn test_force_truncates_single_overlapping_end() {
        let a = existing(1, date!(2024 - 01 - 01), date!(2024 - 01 - 10));
        let b = candidate(date!(2024 - 01 - 08), date!(2024 - 01 - 20));

        let plan = plan_resolution(&b, &[a], true).unwrap();
        assert!(matches!(
            &plan.mutations[..],
            [AssignmentMutation::Truncate { remaining, .. }]
                if *remaining == DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 07)).unwrap()
        ));
    }

    #[test]
    fn test_force_deletes_on_exact_equality() {
        let a = existing(1, date!(2024 - 01 - 01), date!(2024 - 01 - 10));
        let b = candidate(date!(2024 - 01 - 01), date!(2024 - 01 - 10));

        let plan = plan_resolution(&b, &[a], true).unwrap();
        assert!(matches!(
            &plan.mutations[..],
            [AssignmentMutation::Delete { .. }]
        ));
    }

    #[test]
    fn test_no_intersection_produces_empty_plan() {
        let a = existing(1, date!(2024 - 01 - 01), date!(2024 - 01 - 10));
        let b = candidate(date!(2024 - 01 - 11), date!(2024 - 01 - 20));
        let plan = plan_resolution(&b, &[a], false).unwrap();
        assert!(plan.mutations.is_empty());
    }

    #[test]
    fn test_verify_non_overlapping_detects_overlap() {
        let a = existing(1, date!(2024 - 01 - 01), date!(2024 - 01 - 10));
        let b = existing(2, date!(2024 - 01 - 10), date!(2024 - 01 - 12));
        assert!(verify_non_overlapping(&[a.clone()]).is_ok());
        assert!(verify_non_overlapping(&[b, a]).is_err());
    }
}
