//! Dataset endpoints: multipart upload, listings and detail views

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::dataset::{Dataset, DatasetWithProject};
use crate::infrastructure::services::{DatasetDetails, UploadDatasetRequest, UploadedFile};

/// Clients send the selected dataset as `dataset_<id>`; the bare id is also
/// accepted.
fn parse_selected_dataset_id(raw: &str) -> Result<Option<i64>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let digits = trimmed.strip_prefix("dataset_").unwrap_or(trimmed);
    digits
        .parse()
        .map(Some)
        .map_err(|_| ApiError::bad_request(format!("Invalid selectedDatasetId '{}'", raw)))
}

async fn parse_upload(mut multipart: Multipart) -> Result<UploadDatasetRequest, ApiError> {
    let mut project_id: Option<i64> = None;
    let mut selected_dataset_id: Option<i64> = None;
    let mut dataset_name: Option<String> = None;
    let mut description = String::new();
    let mut created_by = "system".to_string();
    let mut images = Vec::new();
    let mut labels = Vec::new();
    let mut config = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "projectId" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                project_id = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ApiError::bad_request(format!("Invalid projectId '{}'", raw)))?,
                );
            }
            "selectedDatasetId" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                selected_dataset_id = parse_selected_dataset_id(&raw)?;
            }
            "datasetName" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if !raw.trim().is_empty() {
                    dataset_name = Some(raw.trim().to_string());
                }
            }
            "updateDescription" => {
                description = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
            }
            "createdBy" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if !raw.trim().is_empty() {
                    created_by = raw.trim().to_string();
                }
            }
            "images" | "labels" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                let uploaded = UploadedFile { file_name, bytes };
                if name == "images" {
                    images.push(uploaded);
                } else {
                    labels.push(uploaded);
                }
            }
            "yaml_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                config = Some(UploadedFile { file_name, bytes });
            }
            // Category metadata sent by the UI; not persisted
            "datasetType" | "dataTypes" => {
                let _ = field.text().await;
            }
            other => {
                return Err(ApiError::bad_request(format!(
                    "Unexpected multipart field '{}'",
                    other
                )));
            }
        }
    }

    let project_id =
        project_id.ok_or_else(|| ApiError::bad_request("Missing required field 'projectId'"))?;

    Ok(UploadDatasetRequest {
        project_id,
        selected_dataset_id,
        dataset_name,
        description,
        created_by,
        images,
        labels,
        config,
    })
}

pub async fn upload_dataset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Dataset>), ApiError> {
    let request = parse_upload(multipart).await?;
    let dataset = state.dataset_service.upload(request).await?;
    Ok((StatusCode::CREATED, Json(dataset)))
}

pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<DatasetWithProject>>, ApiError> {
    let datasets = state.dataset_service.list().await?;
    Ok(Json(datasets))
}

pub async fn list_project_datasets(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<DatasetWithProject>>, ApiError> {
    let datasets = state.dataset_service.list_by_project(project_id).await?;
    Ok(Json(datasets))
}

pub async fn get_dataset_details(
    State(state): State<AppState>,
    Path(dataset_id): Path<i64>,
) -> Result<Json<DatasetDetails>, ApiError> {
    let details = state.dataset_service.details(dataset_id).await?;
    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selected_dataset_id() {
        assert_eq!(parse_selected_dataset_id("dataset_42").unwrap(), Some(42));
        assert_eq!(parse_selected_dataset_id("42").unwrap(), Some(42));
        assert_eq!(parse_selected_dataset_id("").unwrap(), None);
        assert_eq!(parse_selected_dataset_id("  ").unwrap(), None);
        assert!(parse_selected_dataset_id("dataset_abc").is_err());
    }
}
