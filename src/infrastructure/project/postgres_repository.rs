//! PostgreSQL project repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::project::{NewProject, Project, ProjectRepository, ProjectStatus, ProjectUpdate};

/// PostgreSQL-backed implementation of ProjectRepository
#[derive(Debug)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_project(row: &PgRow) -> Project {
    let status: String = row.get("status");
    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get::<Option<String>, _>("description").unwrap_or_default(),
        path: row.get("path"),
        created_by: row.get("created_by"),
        status: ProjectStatus::from_str_lossy(&status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_insert_error(e: sqlx::Error, name: &str) -> DomainError {
    if e.to_string().contains("duplicate key") {
        DomainError::conflict(format!("Project '{}' already exists", name))
    } else {
        DomainError::storage(format!("Failed to insert project: {}", e))
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn insert(&self, project: NewProject) -> Result<Project, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO projects (name, description, path, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.path)
        .bind(&project.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &project.name))?;

        Ok(row_to_project(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Project>, DomainError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get project: {}", e)))?;

        Ok(row.as_ref().map(row_to_project))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Project>, DomainError> {
        let row = sqlx::query("SELECT * FROM projects WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get project by name: {}", e)))?;

        Ok(row.as_ref().map(row_to_project))
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list projects: {}", e)))?;

        Ok(rows.iter().map(row_to_project).collect())
    }

    async fn update(&self, id: i64, update: ProjectUpdate) -> Result<Option<Project>, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                path = COALESCE($4, path),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.path.as_deref())
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict("Another project already uses that name".to_string())
            } else {
                DomainError::storage(format!("Failed to update project: {}", e))
            }
        })?;

        Ok(row.as_ref().map(row_to_project))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete project: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
