//! HTTP request handlers for the attendance API.
//!
//! This module contains the router and the handler functions for all API
//! endpoints. Routes that perform cashier-restricted work sit behind the
//! access gate middleware.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::{AttendanceStatus, Clock};
use crate::error::AttendanceError;
use crate::models::{AttendanceEntry, OverrideEntry, ShiftDefinition, User};
use crate::sales::SalesSummary;
use crate::store::ShiftDraft;

use super::extract::{CurrentUser, RequireAdmin};
use super::gate::require_active_shift;
use super::request::{
    parse_body, AssignShiftRequest, ClockInRequest, ClockOutRequest, ExtendShiftRequest,
    ForceLogoutRequest, OverrideLogQuery,
};
use super::response::ApiErrorResponse;
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/clock-out", post(clock_out_handler))
        .route("/sales-summary/:user_id", get(sales_summary_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_active_shift,
        ));

    Router::new()
        .route("/my-status", get(my_status_handler))
        .route("/clock-in", post(clock_in_handler))
        .merge(gated)
        .route("/override/extend/:user_id", post(extend_shift_handler))
        .route("/override/force-logout/:user_id", post(force_logout_handler))
        .route("/override/logs", get(override_logs_handler))
        .route("/attendance/open", get(open_sessions_handler))
        .route("/attendance/history/:user_id", get(history_handler))
        .route("/shifts", get(list_shifts_handler).post(create_shift_handler))
        .route(
            "/shifts/:shift_id",
            get(get_shift_handler)
                .put(update_shift_handler)
                .delete(delete_shift_handler),
        )
        .route(
            "/users/:user_id/shift",
            put(assign_shift_handler).delete(unassign_shift_handler),
        )
        .with_state(state)
}

fn ensure_self_or_admin(caller: &User, user_id: &str) -> Result<(), AttendanceError> {
    if caller.id == user_id || caller.is_admin() {
        Ok(())
    } else {
        Err(AttendanceError::Forbidden {
            message: "Cannot view another user's records".to_string(),
        })
    }
}

// ============================================================================
// Attendance
// ============================================================================

/// Handler for GET /my-status.
async fn my_status_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<AttendanceStatus>> {
    Ok(Json(state.machine().status(&user.id)?))
}

/// Handler for POST /clock-in.
async fn clock_in_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ClockInRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AttendanceEntry>)> {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(payload, correlation_id)?;

    match state
        .machine()
        .clock_in(&user.id, request.opening_balance, request.notes)
    {
        Ok(entry) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %user.id,
                entry_id = %entry.id,
                "Clock-in accepted"
            );
            Ok((StatusCode::CREATED, Json(entry)))
        }
        Err(err) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %user.id,
                error = %err,
                "Clock-in refused"
            );
            Err(err.into())
        }
    }
}

/// Handler for POST /clock-out. Runs behind the access gate.
async fn clock_out_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ClockOutRequest>, JsonRejection>,
) -> ApiResult<Json<AttendanceEntry>> {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(payload, correlation_id)?;

    match state
        .machine()
        .clock_out(&user, request.closing_balance, request.notes)
    {
        Ok(entry) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %user.id,
                entry_id = %entry.id,
                "Clock-out accepted"
            );
            Ok(Json(entry))
        }
        Err(err) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %user.id,
                error = %err,
                "Clock-out refused"
            );
            Err(err.into())
        }
    }
}

/// Handler for GET /sales-summary/:user_id. Runs behind the access gate.
async fn sales_summary_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<SalesSummary>> {
    ensure_self_or_admin(&user, &user_id)?;
    let since = state.machine().status(&user_id)?.clock_in_time;
    Ok(Json(state.sales().summary(&user_id, since)?))
}

/// Handler for GET /attendance/open.
async fn open_sessions_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    Ok(Json(state.machine().open_sessions()?))
}

/// Handler for GET /attendance/history/:user_id.
async fn history_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<AttendanceEntry>>> {
    ensure_self_or_admin(&user, &user_id)?;
    state.directory().user(&user_id)?;
    Ok(Json(state.machine().history(&user_id)?))
}

// ============================================================================
// Admin overrides
// ============================================================================

/// Handler for POST /override/extend/:user_id.
async fn extend_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
    payload: Result<Json<ExtendShiftRequest>, JsonRejection>,
) -> ApiResult<Json<AttendanceEntry>> {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(payload, correlation_id)?;
    let reason = request.notes.unwrap_or_default();

    let entry = state
        .overrides()
        .extend_shift(&admin, &user_id, request.duration, &reason)
        .inspect_err(|err| {
            warn!(correlation_id = %correlation_id, user_id = %user_id, error = %err, "Extension refused")
        })?;
    Ok(Json(entry))
}

/// Handler for POST /override/force-logout/:user_id.
async fn force_logout_handler(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
    payload: Result<Json<ForceLogoutRequest>, JsonRejection>,
) -> ApiResult<Json<AttendanceEntry>> {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(payload, correlation_id)?;
    let reason = request.notes.unwrap_or_default();

    let entry = state
        .overrides()
        .force_logout(&admin, &user_id, &reason)
        .inspect_err(|err| {
            warn!(correlation_id = %correlation_id, user_id = %user_id, error = %err, "Force logout refused")
        })?;
    Ok(Json(entry))
}

/// Handler for GET /override/logs.
async fn override_logs_handler(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OverrideLogQuery>,
) -> ApiResult<Json<Vec<OverrideEntry>>> {
    Ok(Json(
        state.overrides().history(&admin, query.user_id.as_deref())?,
    ))
}

// ============================================================================
// Shift definitions and assignments
// ============================================================================

/// Handler for GET /shifts.
async fn list_shifts_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<ShiftDefinition>>> {
    Ok(Json(state.directory().shifts()?))
}

/// Handler for GET /shifts/:shift_id.
async fn get_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(shift_id): Path<String>,
) -> ApiResult<Json<ShiftDefinition>> {
    Ok(Json(state.directory().shift(&shift_id)?))
}

/// Handler for POST /shifts.
async fn create_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    payload: Result<Json<ShiftDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ShiftDefinition>)> {
    let draft = parse_body(payload, Uuid::new_v4())?;
    let shift = state.directory().create_shift(draft, state.clock().now())?;
    Ok((StatusCode::CREATED, Json(shift)))
}

/// Handler for PUT /shifts/:shift_id.
async fn update_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(shift_id): Path<String>,
    payload: Result<Json<ShiftDraft>, JsonRejection>,
) -> ApiResult<Json<ShiftDefinition>> {
    let draft = parse_body(payload, Uuid::new_v4())?;
    Ok(Json(state.directory().update_shift(
        &shift_id,
        draft,
        state.clock().now(),
    )?))
}

/// Handler for DELETE /shifts/:shift_id.
async fn delete_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(shift_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.directory().delete_shift(&shift_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for PUT /users/:user_id/shift.
async fn assign_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<String>,
    payload: Result<Json<AssignShiftRequest>, JsonRejection>,
) -> ApiResult<Json<ShiftDefinition>> {
    let request = parse_body(payload, Uuid::new_v4())?;
    state.directory().assign(&user_id, &request.shift_id)?;
    Ok(Json(state.directory().shift(&request.shift_id)?))
}

/// Handler for DELETE /users/:user_id/shift.
async fn unassign_shift_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.directory().user(&user_id)?;
    state.directory().unassign(&user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
