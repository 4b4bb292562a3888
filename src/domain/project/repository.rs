//! Project repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{NewProject, Project, ProjectUpdate};
use crate::domain::error::DomainError;

/// Persistence contract for projects. Inserts return the fully materialized
/// row including the generated id and default timestamps.
#[async_trait]
pub trait ProjectRepository: Send + Sync + Debug {
    async fn insert(&self, project: NewProject) -> Result<Project, DomainError>;

    async fn get(&self, id: i64) -> Result<Option<Project>, DomainError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Project>, DomainError>;

    /// All projects, newest first
    async fn list(&self) -> Result<Vec<Project>, DomainError>;

    /// Apply a partial update; returns None when the project does not exist
    async fn update(&self, id: i64, update: ProjectUpdate) -> Result<Option<Project>, DomainError>;

    async fn delete(&self, id: i64) -> Result<bool, DomainError>;
}
