// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `audit`: audit event lookup and listing
//! - `catalog`: departments, employees, time periods, shifts, settings
//! - `schedule`: assignment range and coverage queries
//! - `attendance`: clock, leave, correction and daily record queries

pub mod attendance;
pub mod audit;
pub mod catalog;
pub mod schedule;
