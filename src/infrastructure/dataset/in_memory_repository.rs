//! In-memory dataset repository implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::dataset::{Dataset, DatasetRepository, DatasetWithProject, NewDataset};
use crate::domain::error::DomainError;
use crate::domain::project::ProjectRepository;

/// In-memory implementation of DatasetRepository. Holds a project repository
/// handle to resolve project names in listings, mirroring the SQL join.
#[derive(Debug)]
pub struct InMemoryDatasetRepository {
    datasets: Arc<RwLock<HashMap<i64, Dataset>>>,
    projects: Arc<dyn ProjectRepository>,
    next_id: AtomicI64,
}

impl InMemoryDatasetRepository {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self {
            datasets: Arc::new(RwLock::new(HashMap::new())),
            projects,
            next_id: AtomicI64::new(1),
        }
    }

    async fn with_project_names(
        &self,
        mut datasets: Vec<Dataset>,
    ) -> Result<Vec<DatasetWithProject>, DomainError> {
        datasets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut joined = Vec::with_capacity(datasets.len());
        for dataset in datasets {
            let project_name = self
                .projects
                .get(dataset.project_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_default();
            joined.push(DatasetWithProject {
                dataset,
                project_name,
            });
        }
        Ok(joined)
    }
}

#[async_trait]
impl DatasetRepository for InMemoryDatasetRepository {
    async fn insert(&self, dataset: NewDataset) -> Result<Dataset, DomainError> {
        let mut datasets = self.datasets.write().await;

        let duplicate = datasets.values().any(|d| {
            d.project_id == dataset.project_id
                && d.name == dataset.name
                && d.version == dataset.version
        });
        if duplicate {
            return Err(DomainError::conflict(format!(
                "Dataset '{}' version '{}' already exists in project {}",
                dataset.name, dataset.version, dataset.project_id
            )));
        }

        let stored = Dataset {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            project_id: dataset.project_id,
            name: dataset.name,
            version: dataset.version,
            file_count: dataset.file_count,
            fingerprint: dataset.fingerprint,
            base_path: dataset.base_path,
            description: dataset.description,
            created_by: dataset.created_by,
            created_at: Utc::now(),
        };

        datasets.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Dataset>, DomainError> {
        let datasets = self.datasets.read().await;
        Ok(datasets.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<DatasetWithProject>, DomainError> {
        let datasets: Vec<Dataset> = {
            let guard = self.datasets.read().await;
            guard.values().cloned().collect()
        };
        self.with_project_names(datasets).await
    }

    async fn list_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<DatasetWithProject>, DomainError> {
        let datasets: Vec<Dataset> = {
            let guard = self.datasets.read().await;
            guard
                .values()
                .filter(|d| d.project_id == project_id)
                .cloned()
                .collect()
        };
        self.with_project_names(datasets).await
    }

    async fn latest_in_chain(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<Option<Dataset>, DomainError> {
        let datasets = self.datasets.read().await;
        Ok(datasets
            .values()
            .filter(|d| d.project_id == project_id && d.name == name)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::NewProject;
    use crate::infrastructure::project::InMemoryProjectRepository;

    fn new_dataset(project_id: i64, name: &str, version: &str) -> NewDataset {
        NewDataset {
            project_id,
            name: name.to_string(),
            version: version.to_string(),
            file_count: 4,
            fingerprint: "abc123".to_string(),
            base_path: format!("/projects/demo/data/{}/{}", name, version),
            description: String::new(),
            created_by: "tester".to_string(),
        }
    }

    async fn repo_with_project() -> (InMemoryDatasetRepository, i64) {
        let projects = Arc::new(InMemoryProjectRepository::new());
        let project = projects
            .insert(NewProject {
                name: "demo".to_string(),
                description: String::new(),
                path: "/projects/demo".to_string(),
                created_by: "tester".to_string(),
            })
            .await
            .unwrap();
        (InMemoryDatasetRepository::new(projects), project.id)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (repo, project_id) = repo_with_project().await;

        let created = repo.insert(new_dataset(project_id, "plates", "v1.0")).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.version, "v1.0");
    }

    #[tokio::test]
    async fn test_duplicate_version_conflicts() {
        let (repo, project_id) = repo_with_project().await;
        repo.insert(new_dataset(project_id, "plates", "v1.0")).await.unwrap();

        let result = repo.insert(new_dataset(project_id, "plates", "v1.0")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_joins_project_name() {
        let (repo, project_id) = repo_with_project().await;
        repo.insert(new_dataset(project_id, "plates", "v1.0")).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].project_name, "demo");
    }

    #[tokio::test]
    async fn test_latest_in_chain_by_creation_time() {
        let (repo, project_id) = repo_with_project().await;
        repo.insert(new_dataset(project_id, "plates", "v1.0")).await.unwrap();
        repo.insert(new_dataset(project_id, "plates", "v1.1")).await.unwrap();
        repo.insert(new_dataset(project_id, "other", "v1.0")).await.unwrap();

        let latest = repo
            .latest_in_chain(project_id, "plates")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.version, "v1.1");

        assert!(repo
            .latest_in_chain(project_id, "missing")
            .await
            .unwrap()
            .is_none());
    }
}
