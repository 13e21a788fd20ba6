//! HTTP API module for the attendance engine.
//!
//! This module provides the REST endpoints for clocking in and out, the
//! access gate in front of cashier-restricted routes, admin overrides and
//! shift administration. Callers are identified by the `X-User-Id` header
//! set by the upstream authentication proxy.

mod extract;
mod gate;
mod handlers;
mod request;
mod response;
mod state;

pub use extract::{CurrentUser, RequireAdmin, USER_ID_HEADER};
pub use gate::{require_active_shift, SHIFT_WARNING_HEADER};
pub use handlers::create_router;
pub use request::{
    AssignShiftRequest, ClockInRequest, ClockOutRequest, ExtendShiftRequest, ForceLogoutRequest,
    OverrideLogQuery,
};
pub use response::{ApiError, ApiErrorResponse, ShiftInfo};
pub use state::AppState;
