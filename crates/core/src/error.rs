// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clockwork_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The command does not belong to the state it was applied to.
    ScopeMismatch {
        /// The employee the state belongs to.
        expected_employee_id: i64,
        /// The employee the command names.
        actual_employee_id: i64,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::ScopeMismatch {
                expected_employee_id,
                actual_employee_id,
            } => write!(
                f,
                "Command for employee {actual_employee_id} applied to the schedule of employee {expected_employee_id}"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
