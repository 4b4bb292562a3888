//! Model repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Model, NewModel};
use crate::domain::error::DomainError;

/// Persistence contract for trained models
#[async_trait]
pub trait ModelRepository: Send + Sync + Debug {
    async fn insert(&self, model: NewModel) -> Result<Model, DomainError>;

    async fn get(&self, id: i64) -> Result<Option<Model>, DomainError>;

    /// Models, optionally filtered to one project, newest first
    async fn list(&self, project_id: Option<i64>) -> Result<Vec<Model>, DomainError>;

    /// Version of the most recently created model trained against the given
    /// dataset id, used to derive the next model version
    async fn latest_version_for_dataset(
        &self,
        dataset_id: &str,
    ) -> Result<Option<String>, DomainError>;
}
