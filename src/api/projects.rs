//! Project management endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::project::{Project, ProjectStatus};
use crate::infrastructure::services::{CreateProjectRequest, UpdateProjectRequest};

/// Request to create a project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectApiRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

fn default_created_by() -> String {
    "system".to_string()
}

/// Request to update a project
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.project_service.list().await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectApiRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = state
        .project_service
        .create(CreateProjectRequest {
            name: request.name,
            description: request.description,
            created_by: request.created_by,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
    let project = state.project_service.get(project_id).await?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<UpdateProjectApiRequest>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .project_service
        .update(
            project_id,
            UpdateProjectRequest {
                name: request.name,
                description: request.description,
                status: request.status,
            },
        )
        .await?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.project_service.delete(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
