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
#![allow(clippy::multiple_crate_versions)]

mod auto_calc;
mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use clap::Parser;
use clockwork_api::{
    ApiError, AuditEventInfo, BatchCreateRequest, BatchCreateResponse, CalendarQuery,
    CalendarResponse, ClockRecordInfo, ClockRecordRequest, ConflictInfo, CorrectionRequest,
    CorrectionResponse, CreateAssignmentRequest, CreateAssignmentResponse,
    CreateDepartmentRequest, CreateDepartmentResponse, CreateEmployeeRequest,
    CreateEmployeeResponse, CreateShiftRequest, CreateShiftResponse, CreateTimePeriodResponse,
    DailyRecordPageResponse, DailyRecordsQuery, Engine, LeaveInfo, LeaveRequest,
    ListSchedulesQuery, ListSchedulesResponse, RecalcJobInfo, RecalculateAccepted,
    RecalculateRequest, ReplaceTimePeriodResponse, SettingsInfo, ShiftInfo, TimePeriodInfo,
    TimePeriodRequest, UpdateSettingsRequest, UpdateSettingsResponse,
};
use clockwork_audit::{Actor, Cause};
use clockwork_persistence::Persistence;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Args, ServerConfig};

const ACTOR_HEADER: &str = "x-actor-id";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// Engine services over the shared persistence layer.
    engine: Engine,
    /// Source of request ids for callers that send none.
    requests: Arc<AtomicU64>,
}

impl AppState {
    fn new(engine: Engine) -> Self {
        Self {
            engine,
            requests: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Attribution for a mutating request.
    ///
    /// The actor is taken from `x-actor-id` and the correlation id from
    /// `x-request-id`. Authentication happens upstream of this server.
    fn attribution(&self, headers: &HeaderMap, description: &str) -> (Actor, Cause) {
        let actor: Actor = header_value(headers, ACTOR_HEADER)
            .map_or_else(|| Actor::api("anonymous"), |id| Actor::api(&id));
        let cause_id: String = header_value(headers, REQUEST_ID_HEADER).unwrap_or_else(|| {
            format!("req-{}", self.requests.fetch_add(1, Ordering::Relaxed))
        });
        (actor, Cause::new(cause_id, description.to_string()))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Query parameters for listing time periods.
#[derive(Debug, Deserialize)]
struct ListTimePeriodsQuery {
    /// Include periods that have been superseded.
    #[serde(default)]
    include_replaced: bool,
}

/// Query parameters for listing audit events.
#[derive(Debug, Deserialize)]
struct AuditQuery {
    /// Restrict to events about one employee.
    employee_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// Machine readable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    /// Intersecting assignments of a rejected schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicts: Option<Vec<ConflictInfo>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    code: Option<&'static str>,
    conflicts: Option<Vec<ConflictInfo>>,
}

impl HttpError {
    const fn plain(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            code: None,
            conflicts: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            code: self.code.map(ToString::to_string),
            conflicts: self.conflicts,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidInput { .. } => Self {
                code: Some("ERR_VALIDATION"),
                ..Self::plain(StatusCode::BAD_REQUEST, err.to_string())
            },
            ApiError::ResourceNotFound { .. } => Self {
                code: Some("ERR_NOT_FOUND"),
                ..Self::plain(StatusCode::NOT_FOUND, err.to_string())
            },
            ApiError::ScheduleConflict { ref conflicts, .. } => Self {
                status: StatusCode::CONFLICT,
                message: err.to_string(),
                code: Some("ERR_SCHEDULE_CONFLICT"),
                conflicts: Some(conflicts.clone()),
            },
            ApiError::TransientStorage { .. } | ApiError::Internal { .. } => {
                error!(error = %err, "Request failed");
                Self {
                    code: Some("ERR_INTERNAL"),
                    ..Self::plain(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            }
        }
    }
}

// ============================================================================
// Schedules
// ============================================================================

/// Handler for POST `/schedules` endpoint.
async fn handle_create_schedule(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<CreateAssignmentResponse>), HttpError> {
    info!(
        employee_id = req.employee_id,
        shift_id = req.shift_id,
        start_date = %req.start_date,
        end_date = %req.end_date,
        force = req.force,
        "Handling create_schedule request"
    );
    let (actor, cause) = app_state.attribution(&headers, "Create schedule assignment");
    let response: CreateAssignmentResponse = app_state
        .engine
        .create_assignment(&req, actor, cause)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for DELETE `/schedules/{assignment_id}` endpoint.
async fn handle_delete_schedule(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(assignment_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    info!(assignment_id, "Handling delete_schedule request");
    let (actor, cause) = app_state.attribution(&headers, "Delete schedule assignment");
    app_state
        .engine
        .delete_assignment(assignment_id, actor, cause)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/schedules/batch` endpoint.
///
/// Conflicts of individual employees are reported in the body, so the
/// request succeeds even when nobody could be scheduled.
async fn handle_batch_schedule(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<BatchCreateRequest>,
) -> Result<Json<BatchCreateResponse>, HttpError> {
    info!(
        departments = ?req.department_ids,
        shift_id = req.shift_id,
        include_sub_departments = req.include_sub_departments,
        "Handling batch_schedule request"
    );
    let (actor, cause) = app_state.attribution(&headers, "Batch schedule departments");
    let response: BatchCreateResponse = app_state.engine.batch_create(&req, actor, cause).await?;
    Ok(Json(response))
}

/// Handler for GET `/schedules` endpoint.
async fn handle_list_schedules(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListSchedulesQuery>,
) -> Result<Json<ListSchedulesResponse>, HttpError> {
    info!(
        employee_id = ?query.employee_id,
        department_id = ?query.department_id,
        "Handling list_schedules request"
    );
    let response: ListSchedulesResponse = app_state.engine.list_schedules(&query).await?;
    Ok(Json(response))
}

/// Handler for GET `/schedules/calendar` endpoint.
async fn handle_schedule_calendar(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, HttpError> {
    info!(employee_id = query.employee_id, "Handling schedule_calendar request");
    let response: CalendarResponse = app_state.engine.schedule_calendar(&query).await?;
    Ok(Json(response))
}

// ============================================================================
// Attendance
// ============================================================================

/// Handler for POST `/attendance/recalculate` endpoint.
///
/// Returns as soon as the job is registered; progress is polled by job id.
async fn handle_start_recalculation(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RecalculateRequest>,
) -> Result<(StatusCode, Json<RecalculateAccepted>), HttpError> {
    info!(
        start_date = %req.start_date,
        end_date = %req.end_date,
        employees = ?req.employee_ids,
        "Handling start_recalculation request"
    );
    let accepted: RecalculateAccepted = app_state.engine.start_recalculation(&req).await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

async fn handle_recalculation_status(
    AxumState(app_state): AxumState<AppState>,
    Path(job_id): Path<u64>,
) -> Result<Json<RecalcJobInfo>, HttpError> {
    let info: RecalcJobInfo = app_state.engine.recalculation_status(job_id).await?;
    Ok(Json(info))
}

async fn handle_cancel_recalculation(
    AxumState(app_state): AxumState<AppState>,
    Path(job_id): Path<u64>,
) -> Result<Json<RecalcJobInfo>, HttpError> {
    info!(job_id, "Handling cancel_recalculation request");
    let info: RecalcJobInfo = app_state.engine.cancel_recalculation(job_id).await?;
    Ok(Json(info))
}

/// Handler for GET `/attendance/daily` endpoint.
async fn handle_list_daily_records(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<DailyRecordsQuery>,
) -> Result<Json<DailyRecordPageResponse>, HttpError> {
    info!(
        employee_id = ?query.employee_id,
        start_date = %query.start_date,
        end_date = %query.end_date,
        "Handling list_daily_records request"
    );
    let page: DailyRecordPageResponse = app_state.engine.list_daily_records(&query).await?;
    Ok(Json(page))
}

async fn handle_record_clock(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ClockRecordRequest>,
) -> Result<(StatusCode, Json<ClockRecordInfo>), HttpError> {
    info!(employee_id = req.employee_id, clock_type = %req.clock_type, "Handling record_clock request");
    let record: ClockRecordInfo = app_state.engine.record_clock(&req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn handle_record_leave(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LeaveRequest>,
) -> Result<(StatusCode, Json<LeaveInfo>), HttpError> {
    info!(employee_id = req.employee_id, category = %req.category, "Handling record_leave request");
    let leave: LeaveInfo = app_state.engine.record_leave(&req).await?;
    Ok((StatusCode::CREATED, Json(leave)))
}

/// Handler for POST `/corrections` endpoint.
///
/// An approved correction recomputes the affected work date before the
/// response is sent.
async fn handle_submit_correction(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CorrectionRequest>,
) -> Result<(StatusCode, Json<CorrectionResponse>), HttpError> {
    info!(
        employee_id = req.employee_id,
        work_date = %req.work_date,
        approved = req.approved,
        "Handling submit_correction request"
    );
    let (actor, cause) = app_state.attribution(&headers, "Submit clock correction");
    let response: CorrectionResponse = app_state
        .engine
        .submit_correction(&req, actor, cause)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// ============================================================================
// Catalog
// ============================================================================

async fn handle_create_time_period(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<TimePeriodRequest>,
) -> Result<(StatusCode, Json<CreateTimePeriodResponse>), HttpError> {
    info!(name = %req.name, "Handling create_time_period request");
    let (actor, cause) = app_state.attribution(&headers, "Create time period");
    let response: CreateTimePeriodResponse = app_state
        .engine
        .create_time_period(&req, actor, cause)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_replace_time_period(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Path(period_id): Path<i64>,
    Json(req): Json<TimePeriodRequest>,
) -> Result<Json<ReplaceTimePeriodResponse>, HttpError> {
    info!(period_id, name = %req.name, "Handling replace_time_period request");
    let (actor, cause) = app_state.attribution(&headers, "Replace time period");
    let response: ReplaceTimePeriodResponse = app_state
        .engine
        .replace_time_period(period_id, &req, actor, cause)
        .await?;
    Ok(Json(response))
}

async fn handle_list_time_periods(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListTimePeriodsQuery>,
) -> Result<Json<Vec<TimePeriodInfo>>, HttpError> {
    let periods: Vec<TimePeriodInfo> = app_state
        .engine
        .list_time_periods(query.include_replaced)
        .await?;
    Ok(Json(periods))
}

async fn handle_create_shift(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateShiftRequest>,
) -> Result<(StatusCode, Json<CreateShiftResponse>), HttpError> {
    info!(name = %req.name, cycle_days = req.cycle_days, "Handling create_shift request");
    let (actor, cause) = app_state.attribution(&headers, "Create shift");
    let response: CreateShiftResponse = app_state.engine.create_shift(&req, actor, cause).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_list_shifts(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<ShiftInfo>>, HttpError> {
    let shifts: Vec<ShiftInfo> = app_state.engine.list_shifts().await?;
    Ok(Json(shifts))
}

async fn handle_create_department(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<CreateDepartmentResponse>), HttpError> {
    info!(name = %req.name, parent_id = ?req.parent_id, "Handling create_department request");
    let (actor, cause) = app_state.attribution(&headers, "Create department");
    let response: CreateDepartmentResponse = app_state
        .engine
        .create_department(&req, actor, cause)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_create_employee(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<CreateEmployeeResponse>), HttpError> {
    info!(name = %req.name, department_id = req.department_id, "Handling create_employee request");
    let (actor, cause) = app_state.attribution(&headers, "Create employee");
    let response: CreateEmployeeResponse = app_state
        .engine
        .create_employee(&req, actor, cause)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// ============================================================================
// Settings, audit, health
// ============================================================================

async fn handle_get_settings(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<SettingsInfo>, HttpError> {
    let settings: SettingsInfo = app_state.engine.get_settings().await?;
    Ok(Json(settings))
}

/// Handler for PUT `/settings` endpoint.
///
/// Stores a new settings version. Existing daily records keep the version
/// they were computed with until they are recalculated.
async fn handle_update_settings(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<UpdateSettingsResponse>, HttpError> {
    info!(
        day_switch_time = %req.day_switch_time,
        auto_calc_time = %req.auto_calc_time,
        timezone = %req.timezone,
        "Handling update_settings request"
    );
    let (actor, cause) = app_state.attribution(&headers, "Update attendance settings");
    let response: UpdateSettingsResponse = app_state
        .engine
        .update_settings(&req, actor, cause)
        .await?;
    Ok(Json(response))
}

async fn handle_list_audit_events(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEventInfo>>, HttpError> {
    let events: Vec<AuditEventInfo> = app_state
        .engine
        .list_audit_events(query.employee_id)
        .await?;
    Ok(Json(events))
}

fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/schedules", post(handle_create_schedule))
        .route("/schedules", get(handle_list_schedules))
        .route("/schedules/{assignment_id}", delete(handle_delete_schedule))
        .route("/schedules/batch", post(handle_batch_schedule))
        .route("/schedules/calendar", get(handle_schedule_calendar))
        .route("/attendance/recalculate", post(handle_start_recalculation))
        .route(
            "/attendance/recalculate/{job_id}",
            get(handle_recalculation_status),
        )
        .route(
            "/attendance/recalculate/{job_id}/cancel",
            post(handle_cancel_recalculation),
        )
        .route("/attendance/daily", get(handle_list_daily_records))
        .route("/clock_records", post(handle_record_clock))
        .route("/leaves", post(handle_record_leave))
        .route("/corrections", post(handle_submit_correction))
        .route("/time_periods", post(handle_create_time_period))
        .route("/time_periods", get(handle_list_time_periods))
        .route(
            "/time_periods/{period_id}/replace",
            post(handle_replace_time_period),
        )
        .route("/shifts", post(handle_create_shift))
        .route("/shifts", get(handle_list_shifts))
        .route("/departments", post(handle_create_department))
        .route("/employees", post(handle_create_employee))
        .route("/settings", get(handle_get_settings))
        .route("/settings", put(handle_update_settings))
        .route("/audit", get(handle_list_audit_events))
        .route("/health", get(|| async { health() }))
        .with_state(app_state)
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown requested");
    token.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();
    let config: ServerConfig = ServerConfig::try_from(args)?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Clockwork Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &config.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let engine: Engine = Engine::new(persistence, config.engine);
    let token: CancellationToken = CancellationToken::new();

    let scheduler = if config.auto_calc {
        Some(tokio::spawn(auto_calc::run(engine.clone(), token.clone())))
    } else {
        info!("Auto calculation disabled");
        None
    };

    let app: Router = build_router(AppState::new(engine));

    info!("Server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(token.clone()))
        .await?;

    token.cancel();
    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            error!(error = %e, "Auto calculation task ended abnormally");
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use clockwork_api::{EngineConfig, JobState};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence = Persistence::new_in_memory().unwrap();
        AppState::new(Engine::new(persistence, EngineConfig::default()))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_HEADER, "planner-1");
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    struct Seeded {
        department_id: i64,
        employee_id: i64,
        shift_id: i64,
    }

    /// Seeds one department, employee, day period and a 5-on/2-off shift.
    async fn seed(app: &Router) -> Seeded {
        let department = body_json(
            send(app, "POST", "/departments", Some(json!({"name": "Operations"}))).await,
        )
        .await;
        let department_id = department["department"]["department_id"].as_i64().unwrap();

        let employee = body_json(
            send(
                app,
                "POST",
                "/employees",
                Some(json!({"name": "Ada", "department_id": department_id})),
            )
            .await,
        )
        .await;
        let employee_id = employee["employee"]["employee_id"].as_i64().unwrap();

        let period = body_json(
            send(
                app,
                "POST",
                "/time_periods",
                Some(json!({
                    "name": "Day",
                    "kind": "fixed",
                    "start_time": "09:00",
                    "end_time": "17:00",
                    "rest_start": null,
                    "rest_end": null,
                    "check_in_start": "08:00",
                    "check_in_end": "10:00",
                    "check_out_start": "16:00",
                    "check_out_end": "19:00",
                    "late_grace_minutes": 0,
                    "early_leave_grace_minutes": 0
                })),
            )
            .await,
        )
        .await;
        let period_id = period["time_period"]["period_id"].as_i64().unwrap();

        let days: Vec<Value> = (1..=5)
            .map(|d| json!({"day_of_cycle": d, "period_ids": [period_id]}))
            .collect();
        let shift = body_json(
            send(
                app,
                "POST",
                "/shifts",
                Some(json!({"name": "Weekdays", "cycle_days": 7, "days": days})),
            )
            .await,
        )
        .await;
        let shift_id = shift["shift"]["shift_id"].as_i64().unwrap();

        Seeded {
            department_id,
            employee_id,
            shift_id,
        }
    }

    fn schedule_body(employee_id: i64, shift_id: i64, start: &str, end: &str, force: bool) -> Value {
        json!({
            "employee_id": employee_id,
            "shift_id": shift_id,
            "start_date": start,
            "end_date": end,
            "force": force
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app: Router = build_router(create_test_app_state());
        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_schedule_returns_created() {
        let app: Router = build_router(create_test_app_state());
        let Seeded {
            employee_id,
            shift_id,
            ..
        } = seed(&app).await;

        let response = send(
            &app,
            "POST",
            "/schedules",
            Some(schedule_body(employee_id, shift_id, "2024-01-01", "2024-01-10", false)),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["assignment"]["start_date"], "2024-01-01");
        assert!(body["mutations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conflicting_schedule_returns_conflict_with_details() {
        let app: Router = build_router(create_test_app_state());
        let Seeded {
            employee_id,
            shift_id,
            ..
        } = seed(&app).await;
        let created = body_json(
            send(
                &app,
                "POST",
                "/schedules",
                Some(schedule_body(employee_id, shift_id, "2024-01-01", "2024-01-10", false)),
            )
            .await,
        )
        .await;
        let existing_id = created["assignment"]["assignment_id"].as_i64().unwrap();

        let response = send(
            &app,
            "POST",
            "/schedules",
            Some(schedule_body(employee_id, shift_id, "2024-01-05", "2024-01-15", false)),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "ERR_SCHEDULE_CONFLICT");
        let conflicts = body["conflicts"].as_array().unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0]["assignment_id"], existing_id);
        assert_eq!(conflicts[0]["overlap_start"], "2024-01-05");
        assert_eq!(conflicts[0]["overlap_end"], "2024-01-10");
    }

    #[tokio::test]
    async fn test_delete_schedule_then_not_found() {
        let app: Router = build_router(create_test_app_state());
        let Seeded {
            employee_id,
            shift_id,
            ..
        } = seed(&app).await;
        let created = body_json(
            send(
                &app,
                "POST",
                "/schedules",
                Some(schedule_body(employee_id, shift_id, "2024-01-01", "2024-01-10", false)),
            )
            .await,
        )
        .await;
        let uri = format!(
            "/schedules/{}",
            created["assignment"]["assignment_id"].as_i64().unwrap()
        );

        let first = send(&app, "DELETE", &uri, None).await;
        assert_eq!(first.status(), HttpStatusCode::NO_CONTENT);

        let second = send(&app, "DELETE", &uri, None).await;
        assert_eq!(second.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_batch_reports_count_and_failures() {
        let app: Router = build_router(create_test_app_state());
        let seeded: Seeded = seed(&app).await;
        send(
            &app,
            "POST",
            "/schedules",
            Some(schedule_body(seeded.employee_id, seeded.shift_id, "2024-01-01", "2024-01-31", false)),
        )
        .await;

        let response = send(
            &app,
            "POST",
            "/schedules/batch",
            Some(json!({
                "department_ids": [seeded.department_id],
                "shift_id": seeded.shift_id,
                "start_date": "2024-01-15",
                "end_date": "2024-02-15"
            })),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 0);
        assert_eq!(body["failures"][0]["employee_id"], seeded.employee_id);
    }

    #[tokio::test]
    async fn test_recalculation_is_accepted_and_pollable() {
        let app: Router = build_router(create_test_app_state());
        let Seeded {
            employee_id,
            shift_id,
            ..
        } = seed(&app).await;
        send(
            &app,
            "POST",
            "/schedules",
            Some(schedule_body(employee_id, shift_id, "2024-03-04", "2024-03-10", false)),
        )
        .await;

        let response = send(
            &app,
            "POST",
            "/attendance/recalculate",
            Some(json!({"start_date": "2024-03-04", "end_date": "2024-03-10"})),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::ACCEPTED);
        let accepted = body_json(response).await;
        assert_eq!(accepted["total_cells"], 7);
        let uri = format!(
            "/attendance/recalculate/{}",
            accepted["job_id"].as_u64().unwrap()
        );

        let mut finished: Option<RecalcJobInfo> = None;
        for _ in 0..500 {
            let status = send(&app, "GET", &uri, None).await;
            assert_eq!(status.status(), HttpStatusCode::OK);
            let info: RecalcJobInfo = serde_json::from_value(body_json(status).await).unwrap();
            if info.state != JobState::Running {
                finished = Some(info);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let info = finished.unwrap();
        assert_eq!(info.state, JobState::Completed);
        assert_eq!(info.completed_cells, 7);

        let daily = send(
            &app,
            "GET",
            &format!(
                "/attendance/daily?employee_id={employee_id}&start_date=2024-03-04&end_date=2024-03-10&page=1&page_size=3"
            ),
            None,
        )
        .await;
        assert_eq!(daily.status(), HttpStatusCode::OK);
        let page = body_json(daily).await;
        assert_eq!(page["total"], 7);
        assert_eq!(page["records"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let app: Router = build_router(create_test_app_state());
        let response = send(&app, "POST", "/attendance/recalculate/42/cancel", None).await;
        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settings_round_trip_through_http() {
        let app: Router = build_router(create_test_app_state());

        let updated = send(
            &app,
            "PUT",
            "/settings",
            Some(json!({
                "day_switch_time": "04:00",
                "auto_calc_time": "05:00",
                "timezone": "Europe/Berlin"
            })),
        )
        .await;
        assert_eq!(updated.status(), HttpStatusCode::OK);

        let current = body_json(send(&app, "GET", "/settings", None).await).await;
        assert_eq!(current["version"], 1);
        assert_eq!(current["timezone"], "Europe/Berlin");

        let events = body_json(send(&app, "GET", "/audit", None).await).await;
        let last = events.as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["action_name"], "UpdateSettings");
        assert_eq!(last["actor_id"], "planner-1");
    }

    #[tokio::test]
    async fn test_malformed_dates_are_bad_requests() {
        let app: Router = build_router(create_test_app_state());
        let Seeded {
            employee_id,
            shift_id,
            ..
        } = seed(&app).await;

        let response = send(
            &app,
            "POST",
            "/schedules",
            Some(schedule_body(employee_id, shift_id, "2024-13-01", "2024-01-10", false)),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "ERR_VALIDATION");

        let listing = send(
            &app,
            "GET",
            "/schedules?start_date=2024-01-01&end_date=2024-01-31",
            None,
        )
        .await;
        assert_eq!(listing.status(), HttpStatusCode::BAD_REQUEST);
    }
}
