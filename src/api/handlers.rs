//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    engine::{DialogClose, InputEvent, Verdict},
    state::{AppState, DisplaySnapshot},
};
use super::responses::{
    ApiResponse, CancelRequest, DurationRequest, GuardResponse, HealthResponse, StatusResponse,
    TaskRequest,
};

fn internal_error(context: &str, e: String) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn display(state: &AppState) -> Result<DisplaySnapshot, StatusCode> {
    state.get_display().map_err(|e| internal_error("Failed to get display", e))
}

fn guard_response(state: &AppState, verdict: Verdict) -> Result<Json<GuardResponse>, StatusCode> {
    Ok(Json(GuardResponse::new(verdict, display(state)?)))
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let started = state.start().map_err(|e| internal_error("Failed to start timer", e))?;
    let timer = display(&state)?;
    if started {
        Ok(Json(ApiResponse::ok("Timer started", timer)))
    } else {
        Ok(Json(ApiResponse::ignored("Timer already running", timer)))
    }
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let paused = state.pause().map_err(|e| internal_error("Failed to pause timer", e))?;
    let timer = display(&state)?;
    if paused {
        Ok(Json(ApiResponse::ok("Timer paused", timer)))
    } else {
        Ok(Json(ApiResponse::ignored("Timer not running", timer)))
    }
}

/// Handle POST /skip - Jump to the other mode
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    state.skip().map_err(|e| internal_error("Failed to skip interval", e))?;
    let timer = display(&state)?;
    info!("Skip endpoint called - now {}", timer.title);
    Ok(Json(ApiResponse::ok("Interval skipped", timer)))
}

/// Handle POST /finish - Stop focus early and record the elapsed time
pub async fn finish_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let finished = state.finish().map_err(|e| internal_error("Failed to finish focus", e))?;
    let timer = display(&state)?;
    if finished {
        Ok(Json(ApiResponse::ok("Focus session recorded", timer)))
    } else {
        Ok(Json(ApiResponse::ignored("No focus time to record", timer)))
    }
}

/// Handle POST /reset - Reset, confirmed first during a running focus interval
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<GuardResponse>, StatusCode> {
    let verdict = state.request_reset().map_err(|e| internal_error("Failed to reset timer", e))?;
    guard_response(&state, verdict)
}

/// Handle POST /duration - Apply custom interval lengths
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let applied = state
        .set_duration(request.focus_minutes, request.break_minutes)
        .map_err(|e| internal_error("Failed to set duration", e))?;
    let timer = display(&state)?;
    if applied {
        Ok(Json(ApiResponse::ok("Durations applied", timer)))
    } else {
        warn!("Ignoring invalid duration request: {:?}", request);
        Ok(Json(ApiResponse::ignored("Durations must be positive", timer)))
    }
}

/// Handle POST /task - Select the task future sessions are recorded against
pub async fn task_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let task_id = request.task_id.filter(|id| !id.is_empty());
    state.set_task(task_id).map_err(|e| internal_error("Failed to select task", e))?;
    Ok(Json(ApiResponse::ok("Task selected", display(&state)?)))
}

/// Handle POST /input - Let the guard judge a key press or click
pub async fn input_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<InputEvent>,
) -> Result<Json<GuardResponse>, StatusCode> {
    let verdict = state.handle_input(&event).map_err(|e| internal_error("Failed to handle input", e))?;
    guard_response(&state, verdict)
}

/// Handle POST /dialog/confirm - Confirm the open guard dialog
pub async fn dialog_confirm_handler(State(state): State<Arc<AppState>>) -> Result<Json<GuardResponse>, StatusCode> {
    resolve_dialog(&state, DialogClose::Confirm)
}

/// Handle POST /dialog/cancel - Cancel, dismiss or escape the open guard dialog
pub async fn dialog_cancel_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<CancelRequest>>,
) -> Result<Json<GuardResponse>, StatusCode> {
    let close = request.map(|Json(r)| r.via).unwrap_or(DialogClose::Cancel);
    // A "confirm" arriving here is still a cancel
    let close = if close == DialogClose::Confirm { DialogClose::Cancel } else { close };
    resolve_dialog(&state, close)
}

fn resolve_dialog(state: &AppState, close: DialogClose) -> Result<Json<GuardResponse>, StatusCode> {
    match state.resolve_dialog(close) {
        Ok(Some(verdict)) => guard_response(state, verdict),
        Ok(None) => {
            warn!("Dialog {:?} requested but no dialog is open", close);
            Err(StatusCode::CONFLICT)
        }
        Err(e) => Err(internal_error("Failed to resolve dialog", e)),
    }
}

/// Handle POST /fullscreen/enter
pub async fn fullscreen_enter_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let timer = display(&state)?;
    if state.fullscreen.enter() {
        Ok(Json(ApiResponse::ok("Fullscreen on", timer)))
    } else {
        Ok(Json(ApiResponse::ignored("Fullscreen not supported", timer)))
    }
}

/// Handle POST /fullscreen/exit
pub async fn fullscreen_exit_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    state.fullscreen.exit();
    Ok(Json(ApiResponse::ok("Fullscreen off", display(&state)?)))
}

/// Handle GET /status - Return timer, guard and statistics
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let (config, timer, credit) = state
        .get_status()
        .map_err(|e| internal_error("Failed to get timer state", e))?;
    let open_dialog = state.get_open_dialog().map_err(|e| internal_error("Failed to get guard state", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        focus_minutes: config.focus_seconds / 60,
        break_minutes: config.break_seconds / 60,
        credit,
        open_dialog,
        stats: state.get_stats(),
        toast: state.toasts.active(),
        fullscreen: state.fullscreen.is_active(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
