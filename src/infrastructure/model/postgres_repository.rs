//! PostgreSQL model repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::model::{Model, ModelRepository, NewModel};

/// PostgreSQL-backed implementation of ModelRepository
#[derive(Debug)]
pub struct PostgresModelRepository {
    pool: PgPool,
}

impl PostgresModelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_model(row: &PgRow) -> Model {
    Model {
        id: row.get("id"),
        project_id: row.get("project_id"),
        dataset_id: row.get("dataset_id"),
        name: row.get("name"),
        version: row.get("version"),
        description: row.get::<Option<String>, _>("description").unwrap_or_default(),
        artifact_path: row.get("artifact_path"),
        framework: row.get("framework"),
        hyperparameters: row.get("hyperparameters"),
        metrics: row.get("metrics"),
        fingerprint: row.get::<Option<String>, _>("fingerprint").unwrap_or_default(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ModelRepository for PostgresModelRepository {
    async fn insert(&self, model: NewModel) -> Result<Model, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO models
                (project_id, dataset_id, name, version, description, artifact_path,
                 framework, hyperparameters, metrics, fingerprint, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(model.project_id)
        .bind(&model.dataset_id)
        .bind(&model.name)
        .bind(&model.version)
        .bind(&model.description)
        .bind(&model.artifact_path)
        .bind(&model.framework)
        .bind(&model.hyperparameters)
        .bind(&model.metrics)
        .bind(&model.fingerprint)
        .bind(&model.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert model: {}", e)))?;

        Ok(row_to_model(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Model>, DomainError> {
        let row = sqlx::query("SELECT * FROM models WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get model: {}", e)))?;

        Ok(row.as_ref().map(row_to_model))
    }

    async fn list(&self, project_id: Option<i64>) -> Result<Vec<Model>, DomainError> {
        let rows = match project_id {
            Some(project_id) => {
                sqlx::query(
                    "SELECT * FROM models WHERE project_id = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(project_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM models ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to list models: {}", e)))?;

        Ok(rows.iter().map(row_to_model).collect())
    }

    async fn latest_version_for_dataset(
        &self,
        dataset_id: &str,
    ) -> Result<Option<String>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT version FROM models
            WHERE dataset_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(dataset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get latest model version: {}", e)))?;

        Ok(row.map(|r| r.get("version")))
    }
}
