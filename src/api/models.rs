//! Trained model endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::model::Model;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListModelsQuery {
    pub project_id: Option<i64>,
}

pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListModelsQuery>,
) -> Result<Json<Vec<Model>>, ApiError> {
    let models = state.model_service.list(query.project_id).await?;
    Ok(Json(models))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
) -> Result<Json<Model>, ApiError> {
    let model = state.model_service.get(model_id).await?;
    Ok(Json(model))
}
