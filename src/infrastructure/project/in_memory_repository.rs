//! In-memory project repository implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::project::{NewProject, Project, ProjectRepository, ProjectStatus, ProjectUpdate};

/// In-memory implementation of ProjectRepository
#[derive(Debug)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<i64, Project>>>,
    next_id: AtomicI64,
}

impl InMemoryProjectRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, project: NewProject) -> Result<Project, DomainError> {
        let mut projects = self.projects.write().await;

        if projects.values().any(|p| p.name == project.name) {
            return Err(DomainError::conflict(format!(
                "Project '{}' already exists",
                project.name
            )));
        }

        let now = Utc::now();
        let stored = Project {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: project.name,
            description: project.description,
            path: project.path,
            created_by: project.created_by,
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };

        projects.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Project>, DomainError> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Project>, DomainError> {
        let projects = self.projects.read().await;
        Ok(projects.values().find(|p| p.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let projects = self.projects.read().await;
        let mut listed: Vec<Project> = projects.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }

    async fn update(&self, id: i64, update: ProjectUpdate) -> Result<Option<Project>, DomainError> {
        let mut projects = self.projects.write().await;

        if let Some(name) = &update.name {
            if projects.values().any(|p| p.id != id && &p.name == name) {
                return Err(DomainError::conflict(format!(
                    "Project '{}' already exists",
                    name
                )));
            }
        }

        let Some(project) = projects.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        if let Some(path) = update.path {
            project.path = path;
        }
        if let Some(status) = update.status {
            project.status = status;
        }
        project.updated_at = Utc::now();

        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut projects = self.projects.write().await;
        Ok(projects.remove(&id).is_some())
    }
}
