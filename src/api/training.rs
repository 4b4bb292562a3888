//! Training endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::training::{TrainingJob, TrainingRun};
use crate::infrastructure::services::StartTrainingRequest;

/// Request to start a training job
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTrainingApiRequest {
    pub project_id: i64,
    pub dataset_id: i64,
    pub model_name: Option<String>,
    #[serde(default)]
    pub training_reason: String,
    #[serde(default = "default_hyperparameters")]
    pub hyperparameters: serde_json::Value,
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

fn default_hyperparameters() -> serde_json::Value {
    serde_json::json!({})
}

fn default_created_by() -> String {
    "system".to_string()
}

/// Accept a training job. The job is registered before this returns, so the
/// id in the response is immediately queryable.
pub async fn start_training(
    State(state): State<AppState>,
    Json(request): Json<StartTrainingApiRequest>,
) -> Result<(StatusCode, Json<TrainingJob>), ApiError> {
    let job = state
        .training_service
        .start(StartTrainingRequest {
            project_id: request.project_id,
            dataset_id: request.dataset_id,
            model_name: request.model_name,
            training_reason: request.training_reason,
            hyperparameters: request.hyperparameters,
            created_by: request.created_by,
        })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

pub async fn get_training_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<TrainingJob>, ApiError> {
    let job = state.training_service.job_status(&job_id).await?;
    Ok(Json(job))
}

pub async fn list_training_runs(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrainingRun>>, ApiError> {
    let runs = state.training_service.list_runs().await?;
    Ok(Json(runs))
}
