//! MLTrack
//!
//! Tracks ML projects end to end: versioned dataset uploads with full
//! copy-forward snapshots, content fingerprints, background training jobs
//! and the lineage from every trained model back to the exact dataset
//! version it was trained on.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::PathBuf;
use std::sync::Arc;

use api::state::AppState;
use domain::dataset::DatasetRepository;
use domain::model::ModelRepository;
use domain::project::ProjectRepository;
use domain::training::TrainingRunRepository;
use infrastructure::dataset::PostgresDatasetRepository;
use infrastructure::model::PostgresModelRepository;
use infrastructure::project::PostgresProjectRepository;
use infrastructure::services::{DatasetService, ModelService, ProjectService, TrainingService};
use infrastructure::storage::{self, PostgresConfig};
use infrastructure::trainer::SimulatedTrainer;
use infrastructure::training::{JobRegistry, PostgresTrainingRunRepository};

/// Build the full application state against PostgreSQL and the configured
/// projects root. Runs schema migrations before returning.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = storage::connect(&PostgresConfig {
        url: config.storage.database_url.clone(),
        max_connections: config.storage.max_connections,
        ..PostgresConfig::default()
    })
    .await?;
    storage::run_migrations(&pool).await?;

    let projects_root = PathBuf::from(&config.storage.projects_root);
    tokio::fs::create_dir_all(&projects_root).await?;

    let project_repo: Arc<dyn ProjectRepository> =
        Arc::new(PostgresProjectRepository::new(pool.clone()));
    let dataset_repo: Arc<dyn DatasetRepository> =
        Arc::new(PostgresDatasetRepository::new(pool.clone()));
    let model_repo: Arc<dyn ModelRepository> = Arc::new(PostgresModelRepository::new(pool.clone()));
    let run_repo: Arc<dyn TrainingRunRepository> =
        Arc::new(PostgresTrainingRunRepository::new(pool));

    let training_service = TrainingService::new(
        Arc::clone(&project_repo),
        Arc::clone(&dataset_repo),
        Arc::clone(&model_repo),
        run_repo,
        Arc::new(SimulatedTrainer::new()),
        JobRegistry::new(),
    );

    Ok(AppState {
        project_service: Arc::new(ProjectService::new(
            Arc::clone(&project_repo),
            projects_root,
        )),
        dataset_service: Arc::new(DatasetService::new(
            Arc::clone(&project_repo),
            Arc::clone(&dataset_repo),
        )),
        model_service: Arc::new(ModelService::new(model_repo)),
        training_service: Arc::new(training_service),
    })
}
