// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine services for the Clockwork attendance engine.
//!
//! [`Engine`] owns the shared storage handle and the concurrency controls
//! around it:
//!
//! - assignment writes are serialized per employee
//! - daily record writes are serialized per (employee, work date)
//! - batch scheduling and recalculation fan out over bounded worker pools
//! - transient storage failures are retried with backoff
//!
//! Requests and responses are plain serde DTOs; the HTTP layer lives in the
//! server crate.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod attendance;
mod catalog;
mod engine;
mod error;
mod keyed_lock;
mod recalc;
mod request_response;
mod retry;
mod schedule;

#[cfg(test)]
mod tests;

pub use attendance::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use engine::{Engine, EngineConfig};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use keyed_lock::KeyedLocks;
pub use recalc::{MAX_RECALC_DAYS, RecalcJobs};
pub use request_response::{
    AssignmentInfo, AuditEventInfo, BatchCreateRequest, BatchCreateResponse, BatchFailure,
    CalendarDayInfo, CalendarQuery, CalendarResponse, CellFailure, ClockRecordInfo,
    ClockRecordRequest, ConflictInfo, CorrectionInfo, CorrectionRequest, CorrectionResponse,
    CreateAssignmentRequest, CreateAssignmentResponse, CreateDepartmentRequest,
    CreateDepartmentResponse, CreateEmployeeRequest, CreateEmployeeResponse, CreateShiftRequest,
    CreateShiftResponse, CreateTimePeriodResponse, DailyRecordInfo, DailyRecordPageResponse,
    DailyRecordsQuery, DateRangeInfo, DepartmentInfo, EmployeeInfo, ExpectedPeriodInfo, JobState,
    LeaveInfo, LeaveRequest, ListSchedulesQuery, ListSchedulesResponse, MutationInfo,
    RecalcJobInfo, RecalculateAccepted, RecalculateRequest, ReplaceTimePeriodResponse,
    SettingsInfo, ShiftDayInfo, ShiftInfo, TimePeriodInfo, TimePeriodRequest,
    UpdateSettingsRequest, UpdateSettingsResponse,
};
pub use retry::RetryPolicy;
pub use schedule::MAX_CALENDAR_DAYS;
