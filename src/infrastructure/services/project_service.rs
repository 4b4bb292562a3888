//! Project service for managing ML projects and their directory skeletons

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::project::{NewProject, Project, ProjectRepository, ProjectStatus, ProjectUpdate};
use crate::infrastructure::materializer;

/// Request to create a project
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

/// Request to partially update a project
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

fn default_created_by() -> String {
    "system".to_string()
}

/// Trait for project service (for dynamic dispatch in AppState)
#[async_trait]
pub trait ProjectServiceTrait: Send + Sync + Debug {
    async fn create(&self, request: CreateProjectRequest) -> Result<Project, DomainError>;

    async fn get(&self, id: i64) -> Result<Project, DomainError>;

    async fn list(&self) -> Result<Vec<Project>, DomainError>;

    async fn update(&self, id: i64, request: UpdateProjectRequest)
        -> Result<Project, DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}

/// Project service implementation
#[derive(Debug)]
pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
    /// Root directory under which every project gets its own subtree
    projects_root: PathBuf,
}

impl ProjectService {
    pub fn new(repository: Arc<dyn ProjectRepository>, projects_root: PathBuf) -> Self {
        Self {
            repository,
            projects_root,
        }
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Project name must not be empty"));
        }
        if trimmed.contains('/') || trimmed.contains("..") {
            return Err(DomainError::validation(
                "Project name must not contain path separators",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectServiceTrait for ProjectService {
    #[instrument(skip(self), fields(name = %request.name))]
    async fn create(&self, request: CreateProjectRequest) -> Result<Project, DomainError> {
        Self::validate_name(&request.name)?;
        let name = request.name.trim().to_string();

        // Check first for a friendly error; the unique constraint still backs
        // this up under concurrent creates.
        if self.repository.get_by_name(&name).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Project '{}' already exists",
                name
            )));
        }

        let project_dir = self.projects_root.join(&name);
        materializer::scaffold_project(&project_dir).await?;

        let created = self
            .repository
            .insert(NewProject {
                name,
                description: request.description,
                path: project_dir.to_string_lossy().into_owned(),
                created_by: request.created_by,
            })
            .await?;

        info!(project_id = created.id, "Created project");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Project, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Project '{}'", id)))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    async fn update(
        &self,
        id: i64,
        request: UpdateProjectRequest,
    ) -> Result<Project, DomainError> {
        if let Some(name) = &request.name {
            Self::validate_name(name)?;
        }

        let update = ProjectUpdate {
            name: request.name.map(|n| n.trim().to_string()),
            description: request.description,
            path: None,
            status: request.status,
        };
        if update.is_empty() {
            return self.get(id).await;
        }

        let updated = self
            .repository
            .update(id, update)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Project '{}'", id)))?;

        info!(project_id = id, "Updated project");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let project = self.get(id).await?;

        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(format!("Project '{}'", id)));
        }

        // Metadata rows cascade in storage; the directory tree is removed
        // best-effort and orphans are tolerated.
        if let Err(err) = tokio::fs::remove_dir_all(&project.path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(project_id = id, %err, "Failed to remove project directory");
            }
        }

        info!(project_id = id, "Deleted project");
        Ok(())
    }
}
