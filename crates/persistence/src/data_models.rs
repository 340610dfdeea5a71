// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_domain::{
    AbsoluteWindow, DailyRecord, ExpectedPeriod, PeriodKind, format_local_datetime,
    parse_local_datetime,
};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// Serializable representation of an absolute window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowData {
    pub start: String,
    pub end: String,
}

/// Serializable representation of an `ExpectedPeriod`.
///
/// Stored as a JSON array in `daily_records.expected_periods_json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedPeriodData {
    pub period_id: i64,
    pub name: String,
    pub kind: String,
    pub start: String,
    pub end: String,
    pub check_in: WindowData,
    pub check_out: WindowData,
    pub rest: Option<WindowData>,
    pub late_grace_minutes: u32,
    pub early_leave_grace_minutes: u32,
}

impl WindowData {
    fn from_window(window: AbsoluteWindow) -> Self {
        Self {
            start: format_local_datetime(window.start),
            end: format_local_datetime(window.end),
        }
    }

    fn to_window(&self) -> Result<AbsoluteWindow, PersistenceError> {
        Ok(AbsoluteWindow {
            start: parse_local_datetime(&self.start)?,
            end: parse_local_datetime(&self.end)?,
        })
    }
}

impl ExpectedPeriodData {
    #[must_use]
    pub fn from_period(period: &ExpectedPeriod) -> Self {
        Self {
            period_id: period.period_id,
            name: period.name.clone(),
            kind: period.kind.as_str().to_string(),
            start: format_local_datetime(period.start),
            end: format_local_datetime(period.end),
            check_in: WindowData::from_window(period.check_in),
            check_out: WindowData::from_window(period.check_out),
            rest: period.rest.map(WindowData::from_window),
            late_grace_minutes: period.late_grace_minutes,
            early_leave_grace_minutes: period.early_leave_grace_minutes,
        }
    }

    /// Rebuilds the domain value.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored field no longer parses.
    pub fn to_period(&self) -> Result<ExpectedPeriod, PersistenceError> {
        Ok(ExpectedPeriod {
            period_id: self.period_id,
            name: self.name.clone(),
            kind: PeriodKind::parse(&self.kind)?,
            start: parse_local_datetime(&self.start)?,
            end: parse_local_datetime(&self.end)?,
            check_in: self.check_in.to_window()?,
            check_out: self.check_out.to_window()?,
            rest: self.rest.as_ref().map(WindowData::to_window).transpose()?,
            late_grace_minutes: self.late_grace_minutes,
            early_leave_grace_minutes: self.early_leave_grace_minutes,
        })
    }
}

/// A daily record together with its stable row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDailyRecord {
    pub record_id: i64,
    pub record: DailyRecord,
    pub calculated_at: Option<String>,
}

/// One page of daily records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecordPage {
    pub records: Vec<StoredDailyRecord>,
    /// Number of records matching the filter across all pages.
    pub total: i64,
}
