use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{AppError, Result},
    files::{StoreError, StoredFile},
    AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub file: String,
    pub size: u64,
    pub modified: String,
}

impl From<StoredFile> for FileResponse {
    fn from(stored: StoredFile) -> Self {
        Self {
            file: stored.name,
            size: stored.size_bytes,
            modified: stored.modified_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub file: String,
    pub size: u64,
}

impl From<StoredFile> for FileUploadResponse {
    fn from(stored: StoredFile) -> Self {
        Self {
            file: stored.name,
            size: stored.size_bytes,
        }
    }
}

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileResponse>>> {
    let files = state.file_store.list().await?;

    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

pub async fn get_file_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FileResponse>> {
    let stored = state
        .file_store
        .metadata(&name)
        .await?
        .ok_or(StoreError::NotFound)?;

    Ok(Json(stored.into()))
}

/// Ingests every multipart part that carries a file name and reports the
/// last one. Parts without a file name are plain form values and skipped.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<FileUploadResponse>> {
    let mut uploaded: Option<StoredFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let stored = state
            .file_store
            .ingest_upload(Some(&file_name), field)
            .await?;

        info!(file = %stored.name, size = stored.size_bytes, "file uploaded");
        uploaded = Some(stored);
    }

    let stored = uploaded.ok_or(StoreError::MissingFile)?;

    Ok(Json(stored.into()))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    state.file_store.delete(&name).await?;

    info!(file = %name, "file deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{FileStore, FileStoreConfig};
    use crate::handlers::routes::create_routes;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        Router,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-FILESTORE-BOUNDARY";

    async fn setup_test_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let file_store = FileStore::new(FileStoreConfig::new(temp_dir.path()));
        file_store.initialize().await.unwrap();

        let app = create_routes().with_state(AppState::new(file_store));
        (app, temp_dir)
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (field, file_name, data) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let disposition = match file_name {
                Some(file_name) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    field, file_name
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/files")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let (app, _temp_dir) = setup_test_app().await;

        let response = app
            .clone()
            .oneshot(multipart_request(&[("file", Some("hello.txt"), b"Hello, World!")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["file"], "hello.txt");
        assert_eq!(body["size"], 13);

        let response = app.oneshot(empty_request(Method::GET, "/api/files")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let files = body.as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["file"], "hello.txt");
        assert_eq!(files[0]["size"], 13);
        assert!(files[0]["modified"].is_string());
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let (app, _temp_dir) = setup_test_app().await;

        let response = app
            .oneshot(multipart_request(&[("comment", None, b"just text")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Required fields are missing!");
    }

    #[tokio::test]
    async fn test_upload_sanitizes_traversal() {
        let (app, temp_dir) = setup_test_app().await;

        let response = app
            .oneshot(multipart_request(&[("file", Some("../../etc/passwd"), b"root:x")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["file"], "passwd");
        assert!(temp_dir.path().join("passwd").is_file());
    }

    #[tokio::test]
    async fn test_file_info_and_delete() {
        let (app, _temp_dir) = setup_test_app().await;

        app.clone()
            .oneshot(multipart_request(&[("file", Some("gone.txt"), b"bye")]))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, "/api/files/gone.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["size"], 3);

        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/api/files/gone.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/api/files/gone.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "File not found");

        let response = app
            .oneshot(empty_request(Method::GET, "/api/files/gone.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_name_rejected() {
        let (app, _temp_dir) = setup_test_app().await;

        let response = app
            .oneshot(empty_request(Method::DELETE, "/api/files/..%2Fsecret"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
