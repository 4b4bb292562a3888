//! In-memory model repository implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::model::{Model, ModelRepository, NewModel};

/// In-memory implementation of ModelRepository
#[derive(Debug)]
pub struct InMemoryModelRepository {
    models: Arc<RwLock<HashMap<i64, Model>>>,
    next_id: AtomicI64,
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self {
            models: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryModelRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelRepository for InMemoryModelRepository {
    async fn insert(&self, model: NewModel) -> Result<Model, DomainError> {
        let mut models = self.models.write().await;

        let stored = Model {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            project_id: model.project_id,
            dataset_id: model.dataset_id,
            name: model.name,
            version: model.version,
            description: model.description,
            artifact_path: model.artifact_path,
            framework: model.framework,
            hyperparameters: model.hyperparameters,
            metrics: model.metrics,
            fingerprint: model.fingerprint,
            created_by: model.created_by,
            created_at: Utc::now(),
        };

        models.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Model>, DomainError> {
        let models = self.models.read().await;
        Ok(models.get(&id).cloned())
    }

    async fn list(&self, project_id: Option<i64>) -> Result<Vec<Model>, DomainError> {
        let models = self.models.read().await;
        let mut listed: Vec<Model> = models
            .values()
            .filter(|m| project_id.is_none_or(|p| m.project_id == p))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }

    async fn latest_version_for_dataset(
        &self,
        dataset_id: &str,
    ) -> Result<Option<String>, DomainError> {
        let models = self.models.read().await;
        Ok(models
            .values()
            .filter(|m| m.dataset_id == dataset_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .map(|m| m.version.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_model(project_id: i64, dataset_id: &str, version: &str) -> NewModel {
        NewModel {
            project_id,
            dataset_id: dataset_id.to_string(),
            name: "demo_model".to_string(),
            version: version.to_string(),
            description: String::new(),
            artifact_path: "/projects/demo/models/demo.pt".to_string(),
            framework: "pytorch".to_string(),
            hyperparameters: json!({"epochs": 10}),
            metrics: json!({"accuracy": 0.9}),
            fingerprint: "abc".to_string(),
            created_by: "tester".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryModelRepository::new();
        let created = repo.insert(new_model(1, "3", "v1.0_model")).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.version, "v1.0_model");
    }

    #[tokio::test]
    async fn test_list_filters_by_project() {
        let repo = InMemoryModelRepository::new();
        repo.insert(new_model(1, "3", "v1.0_model")).await.unwrap();
        repo.insert(new_model(2, "4", "v1.0_model")).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        assert_eq!(repo.list(Some(1)).await.unwrap().len(), 1);
        assert!(repo.list(Some(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_version_for_dataset() {
        let repo = InMemoryModelRepository::new();
        repo.insert(new_model(1, "3", "v1.0_model")).await.unwrap();
        repo.insert(new_model(1, "3", "v1.1_model")).await.unwrap();
        repo.insert(new_model(1, "5", "v2.0_model")).await.unwrap();

        let latest = repo.latest_version_for_dataset("3").await.unwrap();
        assert_eq!(latest.as_deref(), Some("v1.1_model"));

        assert!(repo.latest_version_for_dataset("9").await.unwrap().is_none());
    }
}
