// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use clockwork_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    employee_id: Option<i64>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: Option<String>,
}

fn to_event(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor_data: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
    let action_data: ActionData = serde_json::from_str(&row.action_json)?;
    let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
    let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

    let event: AuditEvent = AuditEvent::new(
        row.employee_id,
        Actor::new(actor_data.id, actor_data.actor_type),
        Cause::new(cause_data.id, cause_data.description),
        Action::new(action_data.name, action_data.details),
        StateSnapshot::new(before_data.data),
        StateSnapshot::new(after_data.data),
    );
    Ok(event.persisted(row.event_id, row.created_at.unwrap_or_default()))
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let result = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn);

    let row: AuditEventRow = match result {
        Ok(r) => r,
        Err(diesel::result::Error::NotFound) => {
            return Err(PersistenceError::NotFound(format!("audit event {event_id}")));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    };

    to_event(row)
}

/// Lists audit events in insertion order, optionally for one employee.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn list_audit_events(
    conn: &mut SqliteConnection,
    employee_id: Option<i64>,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let mut query = audit_events::table
        .select(AuditEventRow::as_select())
        .order(audit_events::event_id.asc())
        .into_boxed();
    if let Some(id) = employee_id {
        query = query.filter(audit_events::employee_id.eq(id));
    }
    query.load(conn)?.into_iter().map(to_event).collect()
}
