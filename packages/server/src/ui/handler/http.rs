//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::StatusDto,
    ui::{state::AppState, status::live_task_count},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current room membership and runtime task count
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusDto> {
    Json(StatusDto {
        sessions: state.room.session_count(),
        tasks: live_task_count(),
    })
}
