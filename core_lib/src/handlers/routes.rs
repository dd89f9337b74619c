//! Route table for the file API

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use super::{files, health};
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handle_health))
        .route(
            "/api/files",
            get(files::list_files).post(files::upload_file),
        )
        .route(
            "/api/files/:name",
            get(files::get_file_info).delete(files::delete_file),
        )
        // upload size is enforced by the file store while streaming
        .layer(DefaultBodyLimit::disable())
}
