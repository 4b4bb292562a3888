//! PostgreSQL connection pooling and schema migrations

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::domain::DomainError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/mltrack".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Open a connection pool against the configured database
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    Ok(pool)
}

/// Create the schema if it does not exist yet. Idempotent; runs at startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            description TEXT,
            path VARCHAR(512) NOT NULL,
            created_by VARCHAR(255) NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'active',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS datasets (
            id BIGSERIAL PRIMARY KEY,
            project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name VARCHAR(255) NOT NULL,
            version VARCHAR(64) NOT NULL,
            file_count INTEGER NOT NULL DEFAULT 0,
            fingerprint VARCHAR(128) NOT NULL,
            base_path VARCHAR(512) NOT NULL UNIQUE,
            description TEXT,
            created_by VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (project_id, name, version)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS models (
            id BIGSERIAL PRIMARY KEY,
            project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            dataset_id VARCHAR(255) NOT NULL,
            name VARCHAR(255) NOT NULL,
            version VARCHAR(64) NOT NULL,
            description TEXT,
            artifact_path VARCHAR(512) NOT NULL,
            framework VARCHAR(64) NOT NULL,
            hyperparameters JSONB NOT NULL DEFAULT '{}'::jsonb,
            metrics JSONB NOT NULL DEFAULT '{}'::jsonb,
            fingerprint VARCHAR(128),
            created_by VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS training_runs (
            id BIGSERIAL PRIMARY KEY,
            job_id VARCHAR(64) NOT NULL UNIQUE,
            project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            model_id BIGINT REFERENCES models(id) ON DELETE SET NULL,
            input_datasets JSONB NOT NULL DEFAULT '[]'::jsonb,
            training_reason TEXT,
            hyperparameters JSONB NOT NULL DEFAULT '{}'::jsonb,
            status VARCHAR(32) NOT NULL,
            created_by VARCHAR(255) NOT NULL,
            started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            completed_at TIMESTAMPTZ,
            error_message TEXT
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DomainError::storage(format!("Migration failed: {}", e)))?;
    }

    info!("Database schema up to date");
    Ok(())
}
