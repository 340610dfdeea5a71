// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use clockwork::CoreError;
use clockwork_domain::{DomainError, format_date};
use clockwork_persistence::PersistenceError;

use crate::request_response::ConflictInfo;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The candidate assignment intersects existing assignments.
    ScheduleConflict {
        /// The employee being scheduled.
        employee_id: i64,
        /// The intersecting assignments and their overlapping sub-ranges.
        conflicts: Vec<ConflictInfo>,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Storage was temporarily unavailable. Retried before it reaches a caller.
    TransientStorage {
        /// A description of the storage failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns whether the operation may succeed if retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStorage { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ScheduleConflict {
                employee_id,
                conflicts,
            } => {
                let ids: Vec<String> = conflicts
                    .iter()
                    .map(|c| c.assignment_id.to_string())
                    .collect();
                write!(
                    f,
                    "Schedule conflict for employee {employee_id} with assignment(s) [{}]",
                    ids.join(", ")
                )
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::TransientStorage { message } => {
                write!(f, "Storage temporarily unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvertedDateRange { .. } => invalid("start_date", message),
        DomainError::InvalidName(_) => invalid("name", message),
        DomainError::InvalidTimePeriod { .. } | DomainError::WindowDoesNotStraddle { .. } => {
            invalid("time_period", message)
        }
        DomainError::InvalidShift { .. }
        | DomainError::DayOfCycleOutOfRange { .. }
        | DomainError::ShiftMismatch { .. } => invalid("shift", message),
        DomainError::InvalidSettings { .. } => invalid("settings", message),
        DomainError::InvalidTimezone(_) => invalid("timezone", message),
        DomainError::InvalidRecord { .. } => invalid("record", message),
        DomainError::DateArithmeticOverflow { .. } | DomainError::DateParseError { .. } => {
            invalid("date", message)
        }
        DomainError::EmployeeInactive(_) => invalid("employee_id", message),
        DomainError::EmployeeNotFound(_) => not_found("Employee", message),
        DomainError::DepartmentNotFound(_) => not_found("Department", message),
        DomainError::ShiftNotFound(_) => not_found("Shift", message),
        DomainError::TimePeriodNotFound(_) => not_found("Time period", message),
        DomainError::AssignmentNotFound(_) => not_found("Schedule assignment", message),
        DomainError::ScheduleConflict {
            employee_id,
            conflicts,
        } => ApiError::ScheduleConflict {
            employee_id,
            conflicts: conflicts
                .iter()
                .map(|c| ConflictInfo {
                    assignment_id: c.assignment_id,
                    start_date: format_date(c.start_date),
                    end_date: format_date(c.end_date),
                    overlap_start: format_date(c.overlap_start),
                    overlap_end: format_date(c.overlap_end),
                })
                .collect(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ScopeMismatch { .. } => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Busy storage becomes `TransientStorage` so the caller can retry it.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Busy(msg) => ApiError::TransientStorage { message: msg },
        PersistenceError::NotFound(msg) => not_found("Record", msg),
        PersistenceError::OverlapDetected { employee_id } => ApiError::ScheduleConflict {
            employee_id,
            conflicts: Vec::new(),
        },
        other => ApiError::Internal {
            message: format!("Persistence error: {other}"),
        },
    }
}
