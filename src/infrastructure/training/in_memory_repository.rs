//! In-memory training run repository implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::training::{NewTrainingRun, TrainingRun, TrainingRunRepository};

/// In-memory implementation of TrainingRunRepository
#[derive(Debug)]
pub struct InMemoryTrainingRunRepository {
    runs: Arc<RwLock<HashMap<i64, TrainingRun>>>,
    next_id: AtomicI64,
}

impl InMemoryTrainingRunRepository {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryTrainingRunRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrainingRunRepository for InMemoryTrainingRunRepository {
    async fn insert(&self, run: NewTrainingRun) -> Result<TrainingRun, DomainError> {
        let mut runs = self.runs.write().await;

        if runs.values().any(|r| r.job_id == run.job_id) {
            return Err(DomainError::conflict(format!(
                "Training run for job '{}' already exists",
                run.job_id
            )));
        }

        let stored = TrainingRun {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            job_id: run.job_id,
            project_id: run.project_id,
            model_id: run.model_id,
            input_datasets: run.input_datasets,
            training_reason: run.training_reason,
            hyperparameters: run.hyperparameters,
            status: run.status,
            created_by: run.created_by,
            started_at: run.started_at,
            completed_at: run.completed_at,
            error_message: run.error_message,
        };

        runs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<TrainingRun>, DomainError> {
        let runs = self.runs.read().await;
        let mut listed: Vec<TrainingRun> = runs.values().cloned().collect();
        listed.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::training::{InputDatasetSnapshot, RunStatus};
    use chrono::Utc;
    use serde_json::json;

    fn new_run(job_id: &str) -> NewTrainingRun {
        NewTrainingRun {
            job_id: job_id.to_string(),
            project_id: 1,
            model_id: Some(7),
            input_datasets: vec![InputDatasetSnapshot {
                dataset_id: "3".to_string(),
                dataset_name: "plates".to_string(),
                dataset_version: "v1.0".to_string(),
                dataset_path: "/projects/demo/data/plates/v1.0".to_string(),
            }],
            training_reason: "initial training".to_string(),
            hyperparameters: json!({"epochs": 10}),
            status: RunStatus::Completed,
            created_by: "tester".to_string(),
            started_at: Utc::now(),
            completed_at: Some(Utc::now()),
            error_message: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let repo = InMemoryTrainingRunRepository::new();
        repo.insert(new_run("job-a")).await.unwrap();
        repo.insert(new_run("job-b")).await.unwrap();

        let runs = repo.list().await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].job_id, "job-b");
    }

    #[tokio::test]
    async fn test_duplicate_job_id_conflicts() {
        let repo = InMemoryTrainingRunRepository::new();
        repo.insert(new_run("job-a")).await.unwrap();

        let result = repo.insert(new_run("job-a")).await;
        assert!(result.is_err());
    }
}
