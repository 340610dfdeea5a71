// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Clock, leave, correction and daily record queries.

use clockwork_domain::{
    AttendanceStatus, ClockRecord, ClockSource, ClockType, CorrectionRecord, DailyRecord,
    DateRange, ExpectedPeriod, LeaveCategory, LeaveRecord, format_date, format_local_datetime,
    parse_date, parse_local_datetime,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::{Date, PrimitiveDateTime};

use crate::data_models::{DailyRecordPage, ExpectedPeriodData, StoredDailyRecord};
use crate::diesel_schema::{clock_records, correction_records, daily_records, leave_records};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = clock_records)]
struct ClockRow {
    record_id: i64,
    employee_id: i64,
    clock_time: String,
    clock_type: String,
    source: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = leave_records)]
struct LeaveRow {
    leave_id: i64,
    employee_id: i64,
    category: String,
    start_time: String,
    end_time: String,
    approved: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = correction_records)]
struct CorrectionRow {
    correction_id: i64,
    employee_id: i64,
    work_date: String,
    clock_type: String,
    clock_time: String,
    reason: String,
    approved: i32,
    clock_record_id: Option<i64>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = daily_records)]
struct DailyRow {
    record_id: i64,
    employee_id: i64,
    work_date: String,
    assignment_id: Option<i64>,
    shift_id: Option<i64>,
    expected_periods_json: String,
    check_in: Option<String>,
    check_out: Option<String>,
    status: Option<String>,
    late_minutes: i64,
    early_leave_minutes: i64,
    settings_version: i64,
    calculated_at: Option<String>,
}

fn to_clock(row: ClockRow) -> Result<ClockRecord, PersistenceError> {
    Ok(ClockRecord {
        record_id: row.record_id,
        employee_id: row.employee_id,
        clock_time: parse_local_datetime(&row.clock_time)?,
        clock_type: ClockType::parse(&row.clock_type)?,
        source: ClockSource::parse(&row.source)?,
    })
}

fn to_leave(row: LeaveRow) -> Result<LeaveRecord, PersistenceError> {
    Ok(LeaveRecord {
        leave_id: row.leave_id,
        employee_id: row.employee_id,
        category: LeaveCategory::parse(&row.category)?,
        start: parse_local_datetime(&row.start_time)?,
        end: parse_local_datetime(&row.end_time)?,
        approved: row.approved != 0,
    })
}

fn to_correction(row: CorrectionRow) -> Result<CorrectionRecord, PersistenceError> {
    Ok(CorrectionRecord {
        correction_id: row.correction_id,
        employee_id: row.employee_id,
        work_date: parse_date(&row.work_date)?,
        clock_type: ClockType::parse(&row.clock_type)?,
        clock_time: parse_local_datetime(&row.clock_time)?,
        reason: row.reason,
        approved: row.approved != 0,
        clock_record_id: row.clock_record_id,
    })
}

fn to_daily(row: DailyRow) -> Result<StoredDailyRecord, PersistenceError> {
    let periods: Vec<ExpectedPeriodData> = serde_json::from_str(&row.expected_periods_json)?;
    let expected_periods: Vec<ExpectedPeriod> = periods
        .iter()
        .map(ExpectedPeriodData::to_period)
        .collect::<Result<_, _>>()?;

    let record: DailyRecord = DailyRecord {
        employee_id: row.employee_id,
        work_date: parse_date(&row.work_date)?,
        assignment_id: row.assignment_id,
        shift_id: row.shift_id,
        expected_periods,
        check_in: row
            .check_in
            .as_deref()
            .map(parse_local_datetime)
            .transpose()?,
        check_out: row
            .check_out
            .as_deref()
            .map(parse_local_datetime)
            .transpose()?,
        status: row
            .status
            .as_deref()
            .map(AttendanceStatus::parse)
            .transpose()?,
        late_minutes: row.late_minutes,
        early_leave_minutes: row.early_leave_minutes,
        settings_version: row.settings_version,
    };

    Ok(StoredDailyRecord {
        record_id: row.record_id,
        record,
        calculated_at: row.calculated_at,
    })
}

/// Lists an employee's clock records in `[from, to)`, ordered by time.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_clock_records(
    conn: &mut SqliteConnection,
    employee_id: i64,
    from: PrimitiveDateTime,
    to: PrimitiveDateTime,
) -> Result<Vec<ClockRecord>, PersistenceError> {
    clock_records::table
        .filter(clock_records::employee_id.eq(employee_id))
        .filter(clock_records::clock_time.ge(format_local_datetime(from)))
        .filter(clock_records::clock_time.lt(format_local_datetime(to)))
        .select(ClockRow::as_select())
        .order((
            clock_records::clock_time.asc(),
            clock_records::record_id.asc(),
        ))
        .load(conn)?
        .into_iter()
        .map(to_clock)
        .collect()
}

/// Lists an employee's approved leave overlapping `[from, to)`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_approved_leaves(
    conn: &mut SqliteConnection,
    employee_id: i64,
    from: PrimitiveDateTime,
    to: PrimitiveDateTime,
) -> Result<Vec<LeaveRecord>, PersistenceError> {
    leave_records::table
        .filter(leave_records::employee_id.eq(employee_id))
        .filter(leave_records::approved.ne(0))
        .filter(leave_records::start_time.lt(format_local_datetime(to)))
        .filter(leave_records::end_time.gt(format_local_datetime(from)))
        .select(LeaveRow::as_select())
        .order((
            leave_records::start_time.asc(),
            leave_records::leave_id.asc(),
        ))
        .load(conn)?
        .into_iter()
        .map(to_leave)
        .collect()
}

/// Looks up one correction.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_correction(
    conn: &mut SqliteConnection,
    correction_id: i64,
) -> Result<Option<CorrectionRecord>, PersistenceError> {
    correction_records::table
        .filter(correction_records::correction_id.eq(correction_id))
        .select(CorrectionRow::as_select())
        .first(conn)
        .optional()?
        .map(to_correction)
        .transpose()
}

/// Looks up the daily record of one employee and work date.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_daily_record(
    conn: &mut SqliteConnection,
    employee_id: i64,
    work_date: Date,
) -> Result<Option<StoredDailyRecord>, PersistenceError> {
    daily_records::table
        .filter(daily_records::employee_id.eq(employee_id))
        .filter(daily_records::work_date.eq(format_date(work_date)))
        .select(DailyRow::as_select())
        .first(conn)
        .optional()?
        .map(to_daily)
        .transpose()
}

/// Lists daily records in a date range, one page at a time.
///
/// Records are ordered by work date then employee. `page` starts at 1.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_daily_records(
    conn: &mut SqliteConnection,
    employee_id: Option<i64>,
    range: DateRange,
    page: i64,
    page_size: i64,
) -> Result<DailyRecordPage, PersistenceError> {
    let start: String = format_date(range.start());
    let end: String = format_date(range.end());

    let mut count_query = daily_records::table
        .count()
        .filter(daily_records::work_date.ge(start.clone()))
        .filter(daily_records::work_date.le(end.clone()))
        .into_boxed();
    let mut page_query = daily_records::table
        .filter(daily_records::work_date.ge(start))
        .filter(daily_records::work_date.le(end))
        .select(DailyRow::as_select())
        .order((
            daily_records::work_date.asc(),
            daily_records::employee_id.asc(),
        ))
        .into_boxed();
    if let Some(id) = employee_id {
        count_query = count_query.filter(daily_records::employee_id.eq(id));
        page_query = page_query.filter(daily_records::employee_id.eq(id));
    }

    let total: i64 = count_query.get_result(conn)?;
    let offset: i64 = (page.max(1) - 1).saturating_mul(page_size);
    let records: Vec<StoredDailyRecord> = page_query
        .limit(page_size)
        .offset(offset)
        .load(conn)?
        .into_iter()
        .map(to_daily)
        .collect::<Result<_, _>>()?;

    Ok(DailyRecordPage { records, total })
}
