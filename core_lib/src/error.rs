//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::files::StoreError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(err) => match err {
                StoreError::InvalidName { .. } | StoreError::MissingFile => {
                    StatusCode::BAD_REQUEST
                }
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                StoreError::UploadIncomplete { .. } | StoreError::StorageUnavailable(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Store(err) if err.is_client_error() => err.to_string(),
            AppError::Store(err) => {
                tracing::error!("Storage error: {:?}", err);
                err.to_string()
            }
            AppError::BadRequest(msg) => msg.clone(),
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}
