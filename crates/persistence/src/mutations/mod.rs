// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `audit`: audit event persistence
//! - `catalog`: departments, employees, time periods, shifts, settings
//! - `schedule`: assignment inserts, truncations and deletions
//! - `attendance`: clock, leave, correction and daily record writes
//! - `transitions`: transactional orchestration (`persist_transition`, `persist_catalog`)

pub mod attendance;
pub mod audit;
pub mod catalog;
pub mod schedule;
pub mod transitions;

pub use transitions::{
    CatalogOutcome, PersistCatalogResult, PersistTransitionResult, persist_catalog,
    persist_transition,
};
