// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Clock, leave, correction and daily record mutations.

use clockwork_domain::{
    AttendanceStatus, ClockRecord, ClockSource, ClockType, CorrectionRecord, DailyRecord,
    LeaveRecord, format_date, format_local_datetime,
};
use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use time::PrimitiveDateTime;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::ExpectedPeriodData;
use crate::diesel_schema::{clock_records, correction_records, daily_records, leave_records};
use crate::error::PersistenceError;

/// Appends a clock record.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_clock_record(
    conn: &mut SqliteConnection,
    employee_id: i64,
    clock_time: PrimitiveDateTime,
    clock_type: ClockType,
    source: ClockSource,
) -> Result<ClockRecord, PersistenceError> {
    diesel::insert_into(clock_records::table)
        .values((
            clock_records::employee_id.eq(employee_id),
            clock_records::clock_time.eq(format_local_datetime(clock_time)),
            clock_records::clock_type.eq(clock_type.as_str()),
            clock_records::source.eq(source.as_str()),
        ))
        .execute(conn)?;
    let record_id: i64 = conn.get_last_insert_rowid()?;
    debug!(record_id, employee_id, source = source.as_str(), "Inserted clock record");

    Ok(ClockRecord {
        record_id,
        employee_id,
        clock_time,
        clock_type,
        source,
    })
}

/// Inserts a leave record.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_leave(
    conn: &mut SqliteConnection,
    leave: &LeaveRecord,
) -> Result<LeaveRecord, PersistenceError> {
    diesel::insert_into(leave_records::table)
        .values((
            leave_records::employee_id.eq(leave.employee_id),
            leave_records::category.eq(leave.category.as_str()),
            leave_records::start_time.eq(format_local_datetime(leave.start)),
            leave_records::end_time.eq(format_local_datetime(leave.end)),
            leave_records::approved.eq(i32::from(leave.approved)),
        ))
        .execute(conn)?;
    let leave_id: i64 = conn.get_last_insert_rowid()?;
    debug!(leave_id, employee_id = leave.employee_id, "Inserted leave record");

    Ok(LeaveRecord {
        leave_id,
        ..leave.clone()
    })
}

/// Inserts a correction. Approved corrections first append a synthetic
/// clock record with source `correction` and link to it.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_correction(
    conn: &mut SqliteConnection,
    correction: &CorrectionRecord,
) -> Result<CorrectionRecord, PersistenceError> {
    let clock_record_id: Option<i64> = if correction.approved {
        Some(
            insert_clock_record(
                conn,
                correction.employee_id,
                correction.clock_time,
                correction.clock_type,
                ClockSource::Correction,
            )?
            .record_id,
        )
    } else {
        None
    };

    diesel::insert_into(correction_records::table)
        .values((
            correction_records::employee_id.eq(correction.employee_id),
            correction_records::work_date.eq(format_date(correction.work_date)),
            correction_records::clock_type.eq(correction.clock_type.as_str()),
            correction_records::clock_time.eq(format_local_datetime(correction.clock_time)),
            correction_records::reason.eq(correction.reason.trim()),
            correction_records::approved.eq(i32::from(correction.approved)),
            correction_records::clock_record_id.eq(clock_record_id),
        ))
        .execute(conn)?;
    let correction_id: i64 = conn.get_last_insert_rowid()?;
    debug!(
        correction_id,
        employee_id = correction.employee_id,
        approved = correction.approved,
        "Inserted correction"
    );

    Ok(CorrectionRecord {
        correction_id,
        reason: correction.reason.trim().to_string(),
        clock_record_id,
        ..correction.clone()
    })
}

/// Writes the daily record of one employee and work date.
///
/// An existing row is overwritten in place so its id never changes.
///
/// # Returns
///
/// The row id.
///
/// # Errors
///
/// Returns an error if serialization or a write fails.
pub fn upsert_daily_record(
    conn: &mut SqliteConnection,
    record: &DailyRecord,
) -> Result<i64, PersistenceError> {
    let periods: Vec<ExpectedPeriodData> = record
        .expected_periods
        .iter()
        .map(ExpectedPeriodData::from_period)
        .collect();
    let periods_json: String = serde_json::to_string(&periods)?;
    let work_date: String = format_date(record.work_date);
    let check_in: Option<String> = record.check_in.map(format_local_datetime);
    let check_out: Option<String> = record.check_out.map(format_local_datetime);
    let status: Option<&str> = record.status.as_ref().map(AttendanceStatus::as_str);

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let existing: Option<i64> = daily_records::table
            .filter(daily_records::employee_id.eq(record.employee_id))
            .filter(daily_records::work_date.eq(work_date.as_str()))
            .select(daily_records::record_id)
            .first(conn)
            .optional()?;

        if let Some(record_id) = existing {
            diesel::update(daily_records::table.filter(daily_records::record_id.eq(record_id)))
                .set((
                    daily_records::assignment_id.eq(record.assignment_id),
                    daily_records::shift_id.eq(record.shift_id),
                    daily_records::expected_periods_json.eq(periods_json.as_str()),
                    daily_records::check_in.eq(check_in.as_deref()),
                    daily_records::check_out.eq(check_out.as_deref()),
                    daily_records::status.eq(status),
                    daily_records::late_minutes.eq(record.late_minutes),
                    daily_records::early_leave_minutes.eq(record.early_leave_minutes),
                    daily_records::settings_version.eq(record.settings_version),
                    daily_records::calculated_at.eq(sql::<Nullable<Text>>("CURRENT_TIMESTAMP")),
                ))
                .execute(conn)?;
            debug!(record_id, employee_id = record.employee_id, %work_date, "Updated daily record");
            return Ok(record_id);
        }

        diesel::insert_into(daily_records::table)
            .values((
                daily_records::employee_id.eq(record.employee_id),
                daily_records::work_date.eq(work_date.as_str()),
                daily_records::assignment_id.eq(record.assignment_id),
                daily_records::shift_id.eq(record.shift_id),
                daily_records::expected_periods_json.eq(periods_json.as_str()),
                daily_records::check_in.eq(check_in.as_deref()),
                daily_records::check_out.eq(check_out.as_deref()),
                daily_records::status.eq(status),
                daily_records::late_minutes.eq(record.late_minutes),
                daily_records::early_leave_minutes.eq(record.early_leave_minutes),
                daily_records::settings_version.eq(record.settings_version),
            ))
            .execute(conn)?;
        let record_id: i64 = conn.get_last_insert_rowid()?;
        debug!(record_id, employee_id = record.employee_id, %work_date, "Inserted daily record");
        Ok(record_id)
    })
}
