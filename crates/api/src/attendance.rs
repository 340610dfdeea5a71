// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Daily record computation and queries.

use clockwork_domain::{
    AttendanceSettings, ClockRecord, DailyRecord, DateRange, DayInputs, LeaveRecord,
    ScheduleAssignment, Shift, TimePeriod, calculate_daily_record,
};
use clockwork_persistence::{DailyRecordPage, StoredDailyRecord};
use time::{Date, Duration, PrimitiveDateTime, Time};
use tracing::debug;

use crate::engine::Engine;
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{DailyRecordInfo, DailyRecordPageResponse, DailyRecordsQuery};
use crate::schedule::{parse_range, require_shift};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Clock and leave data that may belong to `work_date`.
///
/// A work day starts at the day switch on the work date and may run into
/// the following calendar day, so two full days after midnight are enough.
fn fetch_window(work_date: Date) -> Result<(PrimitiveDateTime, PrimitiveDateTime), ApiError> {
    let overflow = || ApiError::InvalidInput {
        field: String::from("work_date"),
        message: format!("Work date {work_date} is out of range"),
    };
    let from: Date = work_date.checked_sub(Duration::days(1)).ok_or_else(overflow)?;
    let to: Date = work_date.checked_add(Duration::days(2)).ok_or_else(overflow)?;
    Ok((
        PrimitiveDateTime::new(from, Time::MIDNIGHT),
        PrimitiveDateTime::new(to, Time::MIDNIGHT),
    ))
}

impl Engine {
    /// Recomputes and stores the daily record of one cell.
    ///
    /// Serialized per (employee, work date). The stored record is replaced
    /// wholesale, so repeated runs with unchanged inputs are idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee's schedule references missing shifts
    /// or periods, or storage fails.
    pub(crate) async fn recalculate_cell(
        &self,
        employee_id: i64,
        work_date: Date,
        settings: &AttendanceSettings,
    ) -> Result<StoredDailyRecord, ApiError> {
        let (from, to) = fetch_window(work_date)?;
        let _guard = self.cell_locks.lock((employee_id, work_date)).await;

        let stored: StoredDailyRecord = self
            .with_persistence("recalculate_cell", |p| {
                let assignment: Option<ScheduleAssignment> = p
                    .assignment_covering(employee_id, work_date)
                    .map_err(translate_persistence_error)?;
                let shift: Option<Shift> = match &assignment {
                    Some(a) => Some(require_shift(p, a.shift_id())?),
                    None => None,
                };
                let period_ids: Vec<i64> = shift
                    .as_ref()
                    .map(|s| s.referenced_period_ids().into_iter().collect())
                    .unwrap_or_default();
                let periods: Vec<TimePeriod> = p
                    .get_time_periods(&period_ids)
                    .map_err(translate_persistence_error)?;
                let clocks: Vec<ClockRecord> = p
                    .list_clock_records(employee_id, from, to)
                    .map_err(translate_persistence_error)?;
                let leaves: Vec<LeaveRecord> = p
                    .list_approved_leaves(employee_id, from, to)
                    .map_err(translate_persistence_error)?;

                let record: DailyRecord = calculate_daily_record(&DayInputs {
                    employee_id,
                    work_date,
                    assignment: assignment.as_ref(),
                    shift: shift.as_ref(),
                    periods: &periods,
                    clocks: &clocks,
                    leaves: &leaves,
                    settings,
                })
                .map_err(translate_domain_error)?;

                p.upsert_daily_record(&record)
                    .map_err(translate_persistence_error)?;
                p.get_daily_record(employee_id, work_date)
                    .map_err(translate_persistence_error)?
                    .ok_or_else(|| ApiError::Internal {
                        message: format!(
                            "Daily record for employee {employee_id} on {work_date} vanished after write"
                        ),
                    })
            })
            .await?;

        debug!(
            employee_id,
            %work_date,
            status = ?stored.record.status,
            late = stored.record.late_minutes,
            early_leave = stored.record.early_leave_minutes,
            "Recalculated daily record"
        );
        Ok(stored)
    }

    /// The settings version currently in force.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn current_settings(&self) -> Result<AttendanceSettings, ApiError> {
        self.with_persistence("load_settings", |p| {
            p.get_current_settings()
                .map_err(translate_persistence_error)
        })
        .await
    }

    /// Recomputes one cell with the current settings.
    ///
    /// # Errors
    ///
    /// Returns the errors of the underlying cell computation.
    pub async fn recalculate_day(
        &self,
        employee_id: i64,
        work_date: Date,
    ) -> Result<DailyRecordInfo, ApiError> {
        let settings: AttendanceSettings = self.current_settings().await?;
        let stored: StoredDailyRecord = self
            .recalculate_cell(employee_id, work_date, &settings)
            .await?;
        Ok(DailyRecordInfo::from_stored(&stored))
    }

    /// Lists one page of stored daily records, ordered by work date then employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the range or paging parameters are invalid.
    pub async fn list_daily_records(
        &self,
        query: &DailyRecordsQuery,
    ) -> Result<DailyRecordPageResponse, ApiError> {
        let range: DateRange = parse_range(&query.start_date, &query.end_date)?;
        let page: i64 = query.page.unwrap_or(1);
        let page_size: i64 = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(ApiError::InvalidInput {
                field: String::from("page"),
                message: String::from("Page numbers start at 1"),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ApiError::InvalidInput {
                field: String::from("page_size"),
                message: format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        let result: DailyRecordPage = self
            .with_persistence("list_daily_records", |p| {
                p.list_daily_records(query.employee_id, range, page, page_size)
                    .map_err(translate_persistence_error)
            })
            .await?;

        Ok(DailyRecordPageResponse {
            records: result
                .records
                .iter()
                .map(DailyRecordInfo::from_stored)
                .collect(),
            page,
            page_size,
            total: result.total,
        })
    }
}
