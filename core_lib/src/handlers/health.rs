//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.file_store.stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().timestamp(),
                "version": state.version,
                "files": stats.file_count,
                "total_size": stats.total_size_bytes,
            })),
        ),
        Err(e) => {
            warn!("Storage directory unavailable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": chrono::Utc::now().timestamp(),
                    "version": state.version,
                    "error": e.to_string(),
                })),
            )
        }
    }
}
