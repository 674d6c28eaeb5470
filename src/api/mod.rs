//! HTTP API module
//!
//! The control surface a host page or tray client drives the timer through.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/reset", post(reset_handler))
        .route("/skip", post(skip_handler))
        .route("/finish", post(finish_handler))
        .route("/duration", post(duration_handler))
        .route("/task", post(task_handler))
        .route("/input", post(input_handler))
        .route("/dialog/confirm", post(dialog_confirm_handler))
        .route("/dialog/cancel", post(dialog_cancel_handler))
        .route("/fullscreen/enter", post(fullscreen_enter_handler))
        .route("/fullscreen/exit", post(fullscreen_exit_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
