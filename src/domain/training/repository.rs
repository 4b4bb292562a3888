//! Training run repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{NewTrainingRun, TrainingRun};
use crate::domain::error::DomainError;

/// Persistence contract for training runs
#[async_trait]
pub trait TrainingRunRepository: Send + Sync + Debug {
    async fn insert(&self, run: NewTrainingRun) -> Result<TrainingRun, DomainError>;

    /// All training runs, newest first
    async fn list(&self) -> Result<Vec<TrainingRun>, DomainError>;
}
