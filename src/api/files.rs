//! Dataset file serving: inline view and download

use std::path::{Component, Path as FsPath, PathBuf};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::types::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct FileQuery {
    /// Path relative to the dataset version directory
    pub path: String,
}

/// Reject absolute paths and any parent-directory traversal
fn resolve_relative(base: &FsPath, relative: &str) -> Result<PathBuf, ApiError> {
    let relative = FsPath::new(relative);
    let traversal = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if traversal || relative.as_os_str().is_empty() {
        return Err(ApiError::bad_request(format!(
            "Invalid file path '{}'",
            relative.display()
        )));
    }
    Ok(base.join(relative))
}

async fn read_dataset_file(
    state: &AppState,
    dataset_id: i64,
    relative: &str,
) -> Result<(PathBuf, Vec<u8>), ApiError> {
    let dataset = state.dataset_service.get(dataset_id).await?;
    let path = resolve_relative(FsPath::new(&dataset.base_path), relative)?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::not_found(format!("File '{}' not found in dataset", relative))
        } else {
            ApiError::internal(format!("Failed to read file: {}", e))
        }
    })?;
    Ok((path, bytes))
}

fn content_type_header(path: &FsPath) -> HeaderValue {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

/// Serve a dataset file inline, e.g. for image previews
pub async fn view_dataset_file(
    State(state): State<AppState>,
    Path(dataset_id): Path<i64>,
    Query(query): Query<FileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (path, bytes) = read_dataset_file(&state, dataset_id, &query.path).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type_header(&path));
    Ok((headers, bytes))
}

/// Serve a dataset file as an attachment
pub async fn download_dataset_file(
    State(state): State<AppState>,
    Path(dataset_id): Path<i64>,
    Query(query): Query<FileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (path, bytes) = read_dataset_file(&state, dataset_id, &query.path).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type_header(&path));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    Ok((headers, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_accepts_nested_paths() {
        let base = FsPath::new("/data/plates/v1.0");
        let resolved = resolve_relative(base, "images/a.jpg").unwrap();
        assert_eq!(resolved, base.join("images/a.jpg"));
    }

    #[test]
    fn test_resolve_relative_rejects_traversal() {
        let base = FsPath::new("/data/plates/v1.0");
        assert!(resolve_relative(base, "../secret").is_err());
        assert!(resolve_relative(base, "images/../../secret").is_err());
        assert!(resolve_relative(base, "/etc/passwd").is_err());
        assert!(resolve_relative(base, "").is_err());
    }

    #[test]
    fn test_content_type_guessing() {
        assert_eq!(
            content_type_header(FsPath::new("a.jpg")),
            HeaderValue::from_static("image/jpeg")
        );
        assert_eq!(
            content_type_header(FsPath::new("data.bin.unknownext")),
            HeaderValue::from_static("application/octet-stream")
        );
    }
}
