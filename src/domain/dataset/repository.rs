//! Dataset repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Dataset, DatasetWithProject, NewDataset};
use crate::domain::error::DomainError;

/// Persistence contract for dataset versions
#[async_trait]
pub trait DatasetRepository: Send + Sync + Debug {
    async fn insert(&self, dataset: NewDataset) -> Result<Dataset, DomainError>;

    async fn get(&self, id: i64) -> Result<Option<Dataset>, DomainError>;

    /// All dataset versions across projects, newest first
    async fn list(&self) -> Result<Vec<DatasetWithProject>, DomainError>;

    /// Dataset versions belonging to one project, newest first
    async fn list_by_project(&self, project_id: i64)
        -> Result<Vec<DatasetWithProject>, DomainError>;

    /// The most recent row of a version chain, selected by creation time.
    /// Versions restored out of chronological order would be mis-identified
    /// here; creation-time order is the deliberate policy.
    async fn latest_in_chain(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<Option<Dataset>, DomainError>;
}
