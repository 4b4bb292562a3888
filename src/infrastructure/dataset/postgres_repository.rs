//! PostgreSQL dataset repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::dataset::{Dataset, DatasetRepository, DatasetWithProject, NewDataset};
use crate::domain::error::DomainError;

/// PostgreSQL-backed implementation of DatasetRepository
#[derive(Debug)]
pub struct PostgresDatasetRepository {
    pool: PgPool,
}

impl PostgresDatasetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_dataset(row: &PgRow) -> Dataset {
    Dataset {
        id: row.get("id"),
        project_id: row.get("project_id"),
        name: row.get("name"),
        version: row.get("version"),
        file_count: row.get("file_count"),
        fingerprint: row.get("fingerprint"),
        base_path: row.get("base_path"),
        description: row.get::<Option<String>, _>("description").unwrap_or_default(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

fn row_to_dataset_with_project(row: &PgRow) -> DatasetWithProject {
    DatasetWithProject {
        dataset: row_to_dataset(row),
        project_name: row.get("project_name"),
    }
}

const LIST_QUERY: &str = r#"
    SELECT d.*, p.name AS project_name
    FROM datasets d
    JOIN projects p ON p.id = d.project_id
"#;

#[async_trait]
impl DatasetRepository for PostgresDatasetRepository {
    async fn insert(&self, dataset: NewDataset) -> Result<Dataset, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO datasets
                (project_id, name, version, file_count, fingerprint, base_path, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(dataset.project_id)
        .bind(&dataset.name)
        .bind(&dataset.version)
        .bind(dataset.file_count)
        .bind(&dataset.fingerprint)
        .bind(&dataset.base_path)
        .bind(&dataset.description)
        .bind(&dataset.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict(format!(
                    "Dataset '{}' version '{}' already exists",
                    dataset.name, dataset.version
                ))
            } else {
                DomainError::storage(format!("Failed to insert dataset: {}", e))
            }
        })?;

        Ok(row_to_dataset(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Dataset>, DomainError> {
        let row = sqlx::query("SELECT * FROM datasets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get dataset: {}", e)))?;

        Ok(row.as_ref().map(row_to_dataset))
    }

    async fn list(&self) -> Result<Vec<DatasetWithProject>, DomainError> {
        let query = format!("{} ORDER BY d.created_at DESC, d.id DESC", LIST_QUERY);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list datasets: {}", e)))?;

        Ok(rows.iter().map(row_to_dataset_with_project).collect())
    }

    async fn list_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<DatasetWithProject>, DomainError> {
        let query = format!(
            "{} WHERE d.project_id = $1 ORDER BY d.created_at DESC, d.id DESC",
            LIST_QUERY
        );
        let rows = sqlx::query(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list datasets: {}", e)))?;

        Ok(rows.iter().map(row_to_dataset_with_project).collect())
    }

    async fn latest_in_chain(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<Option<Dataset>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM datasets
            WHERE project_id = $1 AND name = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(project_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get latest dataset: {}", e)))?;

        Ok(row.as_ref().map(row_to_dataset))
    }
}
