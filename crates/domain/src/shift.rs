// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cyclic shift patterns.

use crate::date_range::DateRange;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;

/// Longest supported cycle.
pub const MAX_CYCLE_DAYS: u16 = 366;

/// A repeating pattern of `cycle_days` positions.
///
/// `days[n]` holds the time period ids worked on cycle position `n + 1`.
/// An empty position is a rest day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    shift_id: Option<i64>,
    name: String,
    cycle_days: u16,
    days: Vec<Vec<i64>>,
}

impl Shift {
    /// Creates a shift from a dense per-position table.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the cycle length is out of
    /// range, or the table length differs from the cycle length.
    pub fn new(name: &str, cycle_days: u16, days: Vec<Vec<i64>>) -> Result<Self, DomainError> {
        let name: String = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidName(String::from(
                "Shift name cannot be empty",
            )));
        }
        if cycle_days == 0 || cycle_days > MAX_CYCLE_DAYS {
            return Err(DomainError::InvalidShift {
                reason: format!("cycle length must be between 1 and {MAX_CYCLE_DAYS} days"),
            });
        }
        if days.len() != usize::from(cycle_days) {
            return Err(DomainError::InvalidShift {
                reason: format!(
                    "expected {cycle_days} cycle positions, found {}",
                    days.len()
                ),
            });
        }

        let days: Vec<Vec<i64>> = days
            .into_iter()
            .map(|ids| {
                let unique: BTreeSet<i64> = ids.into_iter().collect();
                unique.into_iter().collect()
            })
            .collect();

        Ok(Self {
            shift_id: None,
            name,
            cycle_days,
            days,
        })
    }

    /// Creates a shift from sparse `(day_of_cycle, period_ids)` entries.
    ///
    /// Positions not mentioned are rest days. Repeated positions are merged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DayOfCycleOutOfRange` for a position outside
    /// `[1, cycle_days]`, plus every error of [`Shift::new`].
    pub fn from_positions(
        name: &str,
        cycle_days: u16,
        entries: &[(u16, Vec<i64>)],
    ) -> Result<Self, DomainError> {
        if cycle_days == 0 || cycle_days > MAX_CYCLE_DAYS {
            return Err(DomainError::InvalidShift {
                reason: format!("cycle length must be between 1 and {MAX_CYCLE_DAYS} days"),
            });
        }

        let mut days: Vec<Vec<i64>> = vec![Vec::new(); usize::from(cycle_days)];
        for (day_of_cycle, period_ids) in entries {
            if *day_of_cycle == 0 || *day_of_cycle > cycle_days {
                return Err(DomainError::DayOfCycleOutOfRange {
                    day_of_cycle: *day_of_cycle,
                    cycle_days,
                });
            }
            days[usize::from(*day_of_cycle - 1)].extend(period_ids.iter().copied());
        }

        Self::new(name, cycle_days, days)
    }

    /// Attaches the persisted identifier.
    #[must_use]
    pub const fn with_id(mut self, shift_id: i64) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    #[must_use]
    pub const fn shift_id(&self) -> Option<i64> {
        self.shift_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn cycle_days(&self) -> u16 {
        self.cycle_days
    }

    /// The dense per-position table.
    #[must_use]
    pub fn days(&self) -> &[Vec<i64>] {
        &self.days
    }

    /// Period ids worked on a 1-based cycle position.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DayOfCycleOutOfRange` for a position outside the cycle.
    pub fn periods_on(&self, day_of_cycle: u16) -> Result<&[i64], DomainError> {
        if day_of_cycle == 0 || day_of_cycle > self.cycle_days {
            return Err(DomainError::DayOfCycleOutOfRange {
                day_of_cycle,
                cycle_days: self.cycle_days,
            });
        }
        Ok(&self.days[usize::from(day_of_cycle - 1)])
    }

    /// Cycle position of `work_date` for a pattern anchored at `anchor`.
    ///
    /// Uses the integer calendar-day difference so the result never depends
    /// on timezone offsets. Dates before the anchor wrap backwards.
    #[must_use]
    pub fn day_of_cycle(&self, anchor: Date, work_date: Date) -> u16 {
        let diff: i64 = DateRange::days_between(anchor, work_date);
        let position: i64 = diff.rem_euclid(i64::from(self.cycle_days)) + 1;
        u16::try_from(position).unwrap_or(1)
    }

    /// Every period id referenced by any position.
    #[must_use]
    pub fn referenced_period_ids(&self) -> BTreeSet<i64> {
        self.days.iter().flatten().copied().collect()
    }

    /// Replaces every reference to `old` with `new`. Returns whether anything changed.
    pub fn repoint(&mut self, old: i64, new: i64) -> bool {
        let mut changed: bool = false;
        for ids in &mut self.days {
            if ids.contains(&old) {
                ids.retain(|id| *id != old);
                if !ids.contains(&new) {
                    ids.push(new);
                }
                ids.sort_unstable();
                changed = true;
            }
        }
        changed
    }
}
