//! Model catalog service

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::model::{Model, ModelRepository};

/// Trait for model service (for dynamic dispatch in AppState)
#[async_trait]
pub trait ModelServiceTrait: Send + Sync + Debug {
    async fn get(&self, id: i64) -> Result<Model, DomainError>;

    /// Models, optionally scoped to one project, newest first
    async fn list(&self, project_id: Option<i64>) -> Result<Vec<Model>, DomainError>;
}

/// Model service implementation
#[derive(Debug)]
pub struct ModelService {
    repository: Arc<dyn ModelRepository>,
}

impl ModelService {
    pub fn new(repository: Arc<dyn ModelRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ModelServiceTrait for ModelService {
    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Model, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Model '{}'", id)))
    }

    #[instrument(skip(self))]
    async fn list(&self, project_id: Option<i64>) -> Result<Vec<Model>, DomainError> {
        self.repository.list(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NewModel;
    use crate::infrastructure::model::InMemoryModelRepository;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_and_list() {
        let repository = Arc::new(InMemoryModelRepository::new());
        let service = ModelService::new(Arc::clone(&repository) as Arc<dyn ModelRepository>);

        let created = repository
            .insert(NewModel {
                project_id: 1,
                dataset_id: "3".to_string(),
                name: "plates_model".to_string(),
                version: "v1.0_model".to_string(),
                description: String::new(),
                artifact_path: "/projects/demo/models/plates.pt".to_string(),
                framework: "pytorch".to_string(),
                hyperparameters: json!({}),
                metrics: json!({}),
                fingerprint: "fp".to_string(),
                created_by: "tester".to_string(),
            })
            .await
            .unwrap();

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.version, "v1.0_model");

        assert_eq!(service.list(Some(1)).await.unwrap().len(), 1);
        assert!(service.list(Some(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = ModelService::new(Arc::new(InMemoryModelRepository::new()));
        assert!(matches!(
            service.get(42).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
