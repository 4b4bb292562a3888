//! PostgreSQL training run repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::training::{
    InputDatasetSnapshot, NewTrainingRun, RunStatus, TrainingRun, TrainingRunRepository,
};

/// PostgreSQL-backed implementation of TrainingRunRepository
#[derive(Debug)]
pub struct PostgresTrainingRunRepository {
    pool: PgPool,
}

impl PostgresTrainingRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_run(row: &PgRow) -> Result<TrainingRun, DomainError> {
    let status: String = row.get("status");
    let input_datasets: serde_json::Value = row.get("input_datasets");
    let input_datasets: Vec<InputDatasetSnapshot> = serde_json::from_value(input_datasets)
        .map_err(|e| DomainError::storage(format!("Corrupt input_datasets column: {}", e)))?;

    Ok(TrainingRun {
        id: row.get("id"),
        job_id: row.get("job_id"),
        project_id: row.get("project_id"),
        model_id: row.get("model_id"),
        input_datasets,
        training_reason: row
            .get::<Option<String>, _>("training_reason")
            .unwrap_or_default(),
        hyperparameters: row.get("hyperparameters"),
        status: RunStatus::from_str_lossy(&status),
        created_by: row.get("created_by"),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
        error_message: row.get("error_message"),
    })
}

#[async_trait]
impl TrainingRunRepository for PostgresTrainingRunRepository {
    async fn insert(&self, run: NewTrainingRun) -> Result<TrainingRun, DomainError> {
        let input_datasets = serde_json::to_value(&run.input_datasets)
            .map_err(|e| DomainError::storage(format!("Failed to serialize snapshots: {}", e)))?;

        let row = sqlx::query(
            r#"
            INSERT INTO training_runs
                (job_id, project_id, model_id, input_datasets, training_reason,
                 hyperparameters, status, created_by, started_at, completed_at, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&run.job_id)
        .bind(run.project_id)
        .bind(run.model_id)
        .bind(&input_datasets)
        .bind(&run.training_reason)
        .bind(&run.hyperparameters)
        .bind(run.status.as_str())
        .bind(&run.created_by)
        .bind(run.started_at)
        .bind(run.completed_at)
        .bind(run.error_message.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict(format!(
                    "Training run for job '{}' already exists",
                    run.job_id
                ))
            } else {
                DomainError::storage(format!("Failed to insert training run: {}", e))
            }
        })?;

        row_to_run(&row)
    }

    async fn list(&self) -> Result<Vec<TrainingRun>, DomainError> {
        let rows = sqlx::query("SELECT * FROM training_runs ORDER BY started_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list training runs: {}", e)))?;

        rows.iter().map(row_to_run).collect()
    }
}
