use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use super::{datasets, files, health, models, projects, training};

/// Uploads carry whole dataset versions; allow larger bodies than the default
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // Projects
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/{project_id}", get(projects::get_project))
        .route("/projects/{project_id}", put(projects::update_project))
        .route("/projects/{project_id}", delete(projects::delete_project))
        .route(
            "/projects/{project_id}/datasets",
            get(datasets::list_project_datasets),
        )
        // Datasets
        .route("/datasets", get(datasets::list_datasets))
        .route("/datasets/{dataset_id}", get(datasets::get_dataset_details))
        .route(
            "/datasets/{dataset_id}/files/view",
            get(files::view_dataset_file),
        )
        .route(
            "/datasets/{dataset_id}/files/download",
            get(files::download_dataset_file),
        )
        .route("/upload/dataset", post(datasets::upload_dataset))
        // Training
        .route("/training/start", post(training::start_training))
        .route(
            "/training/status/{job_id}",
            get(training::get_training_status),
        )
        .route("/training/runs", get(training::list_training_runs))
        // Models
        .route("/models", get(models::list_models))
        .route("/models/{model_id}", get(models::get_model))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
