// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use serde::{Deserialize, Serialize};

/// The entity that initiated a change.
///
/// Either an API caller, identified by whatever id the caller supplied, or
/// the engine itself acting on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the actor.
    pub id: String,
    /// Kind of actor: `api` or `system`.
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The engine acting on its own schedule.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("clockwork"), String::from("system"))
    }

    /// A caller of the HTTP interface.
    #[must_use]
    pub fn api(id: &str) -> Self {
        Self::new(id.to_string(), String::from("api"))
    }

    /// Returns whether this actor is the engine itself.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.actor_type == "system"
    }
}

/// Why a change happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// Correlation id, typically a request or job id.
    pub id: String,
    /// Human readable description.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name, for example `CreateAssignment`.
    pub name: String,
    /// Optional free-form details.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Serialized state before or after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Snapshot payload, JSON by convention.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new snapshot.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// A snapshot for the absence of state.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(String::from("null"))
    }
}

/// An immutable record of one change.
///
/// Assignment mutations carry the employee they affect. Catalog and settings
/// changes have no employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Identifier assigned by storage, `None` before persistence.
    pub event_id: Option<i64>,
    /// Employee affected by the change, if any.
    pub employee_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    /// Storage timestamp, `None` before persistence.
    pub created_at: Option<String>,
}

impl AuditEvent {
    /// Creates an unpersisted audit event.
    #[must_use]
    pub const fn new(
        employee_id: Option<i64>,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            employee_id,
            actor,
            cause,
            action,
            before,
            after,
            created_at: None,
        }
    }

    /// Attaches storage-assigned fields.
    #[must_use]
    pub fn persisted(mut self, event_id: i64, created_at: String) -> Self {
        self.event_id = Some(event_id);
        self.created_at = Some(created_at);
        self
    }
}
