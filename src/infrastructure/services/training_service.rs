//! Training orchestration service
//!
//! `start` validates its inputs, registers a Running job in the registry and
//! only then hands the work to a background task. Everything that can go
//! wrong after acceptance is captured on the job record; background errors
//! never propagate to the caller.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::domain::dataset::{Dataset, DatasetRepository};
use crate::domain::error::DomainError;
use crate::domain::model::{ModelRepository, NewModel};
use crate::domain::project::{Project, ProjectRepository};
use crate::domain::training::{
    Hyperparameters, InputDatasetSnapshot, JobId, ModelTrainer, NewTrainingRun, OutcomeStatus,
    ProgressFn, RunStatus, TrainingJob, TrainingRun, TrainingRunRepository,
};
use crate::domain::versioning::next_model_version;
use crate::infrastructure::training::JobRegistry;

/// Request to start a training job
#[derive(Debug, Clone)]
pub struct StartTrainingRequest {
    pub project_id: i64,
    pub dataset_id: i64,
    pub model_name: Option<String>,
    pub training_reason: String,
    /// Raw hyperparameter JSON; unknown keys are ignored, absent keys default
    pub hyperparameters: serde_json::Value,
    pub created_by: String,
}

/// Trait for training service (for dynamic dispatch in AppState)
#[async_trait]
pub trait TrainingServiceTrait: Send + Sync + Debug {
    /// Validate and accept a training request. The returned job is already
    /// registered and Running when this resolves.
    async fn start(&self, request: StartTrainingRequest) -> Result<TrainingJob, DomainError>;

    async fn job_status(&self, job_id: &str) -> Result<TrainingJob, DomainError>;

    async fn list_runs(&self) -> Result<Vec<TrainingRun>, DomainError>;
}

/// Training service implementation
#[derive(Debug, Clone)]
pub struct TrainingService {
    projects: Arc<dyn ProjectRepository>,
    datasets: Arc<dyn DatasetRepository>,
    models: Arc<dyn ModelRepository>,
    runs: Arc<dyn TrainingRunRepository>,
    trainer: Arc<dyn ModelTrainer>,
    registry: JobRegistry,
}

impl TrainingService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        datasets: Arc<dyn DatasetRepository>,
        models: Arc<dyn ModelRepository>,
        runs: Arc<dyn TrainingRunRepository>,
        trainer: Arc<dyn ModelTrainer>,
        registry: JobRegistry,
    ) -> Self {
        Self {
            projects,
            datasets,
            models,
            runs,
            trainer,
            registry,
        }
    }

    /// Run the trainer and record the outcome. Returns the completed model id
    /// and version, or the failure message.
    async fn execute(
        &self,
        job_id: &JobId,
        project: &Project,
        dataset: &Dataset,
        request: &StartTrainingRequest,
        hyperparameters: &Hyperparameters,
    ) -> Result<(i64, String), String> {
        let model_name = request
            .model_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{}_model", dataset.name));
        let artifact_path = Path::new(&project.path)
            .join("models")
            .join(format!("{}_{}.pt", dataset.name, job_id));

        let registry = self.registry.clone();
        let progress_job = job_id.clone();
        let progress: ProgressFn = Arc::new(move |p| {
            // Negative values signal failure; the failed outcome carries the
            // message, so only forward real progress.
            if p >= 0 {
                registry.update(&progress_job, |job| job.set_progress(p));
            }
        });

        let outcome = self
            .trainer
            .train(
                Path::new(&dataset.base_path),
                &artifact_path,
                hyperparameters,
                progress,
            )
            .await;

        if outcome.status == OutcomeStatus::Failed {
            return Err(outcome
                .error
                .unwrap_or_else(|| "Training failed".to_string()));
        }

        let dataset_key = dataset.id.to_string();
        let latest = self
            .models
            .latest_version_for_dataset(&dataset_key)
            .await
            .map_err(|e| e.to_string())?;
        let version = next_model_version(&dataset.version, latest.as_deref());

        let model = self
            .models
            .insert(NewModel {
                project_id: project.id,
                dataset_id: dataset_key,
                name: model_name,
                version: version.clone(),
                description: request.training_reason.clone(),
                artifact_path: artifact_path.to_string_lossy().into_owned(),
                framework: "pytorch".to_string(),
                hyperparameters: request.hyperparameters.clone(),
                metrics: json!({
                    "final_loss": outcome.final_loss,
                    "final_accuracy": outcome.final_accuracy,
                    "epochs_completed": outcome.epochs_completed,
                }),
                fingerprint: dataset.fingerprint.clone(),
                created_by: request.created_by.clone(),
            })
            .await
            .map_err(|e| e.to_string())?;

        Ok((model.id, version))
    }

    fn dataset_snapshot(dataset: &Dataset) -> Vec<InputDatasetSnapshot> {
        vec![InputDatasetSnapshot {
            dataset_id: dataset.id.to_string(),
            dataset_name: dataset.name.clone(),
            dataset_version: dataset.version.clone(),
            dataset_path: dataset.base_path.clone(),
        }]
    }

    async fn record_run(
        &self,
        job_id: &JobId,
        dataset: &Dataset,
        request: &StartTrainingRequest,
        started_at: chrono::DateTime<Utc>,
        model_id: Option<i64>,
        status: RunStatus,
        error_message: Option<String>,
    ) {
        let run = NewTrainingRun {
            job_id: job_id.as_str().to_string(),
            project_id: request.project_id,
            model_id,
            input_datasets: Self::dataset_snapshot(dataset),
            training_reason: request.training_reason.clone(),
            hyperparameters: request.hyperparameters.clone(),
            status,
            created_by: request.created_by.clone(),
            started_at,
            completed_at: Some(Utc::now()),
            error_message,
        };

        if let Err(err) = self.runs.insert(run).await {
            warn!(job_id = %job_id, %err, "Failed to persist training run");
        }
    }

    async fn run_in_background(
        self,
        job_id: JobId,
        project: Project,
        dataset: Dataset,
        request: StartTrainingRequest,
        hyperparameters: Hyperparameters,
    ) {
        let started_at = Utc::now();

        match self
            .execute(&job_id, &project, &dataset, &request, &hyperparameters)
            .await
        {
            Ok((model_id, version)) => {
                self.record_run(
                    &job_id,
                    &dataset,
                    &request,
                    started_at,
                    Some(model_id),
                    RunStatus::Completed,
                    None,
                )
                .await;
                self.registry
                    .update(&job_id, |job| job.complete(model_id, version.clone()));
                info!(job_id = %job_id, model_id, version = %version, "Training completed");
            }
            Err(error) => {
                self.record_run(
                    &job_id,
                    &dataset,
                    &request,
                    started_at,
                    None,
                    RunStatus::Failed,
                    Some(error.clone()),
                )
                .await;
                self.registry.update(&job_id, |job| job.fail(error.clone()));
                warn!(job_id = %job_id, %error, "Training failed");
            }
        }
    }
}

#[async_trait]
impl TrainingServiceTrait for TrainingService {
    #[instrument(skip(self, request), fields(project_id = request.project_id, dataset_id = request.dataset_id))]
    async fn start(&self, request: StartTrainingRequest) -> Result<TrainingJob, DomainError> {
        let project = self
            .projects
            .get(request.project_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Project '{}'", request.project_id)))?;
        let dataset = self
            .datasets
            .get(request.dataset_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Dataset '{}'", request.dataset_id)))?;
        if dataset.project_id != project.id {
            return Err(DomainError::validation(format!(
                "Dataset '{}' does not belong to project '{}'",
                dataset.id, project.id
            )));
        }

        let hyperparameters: Hyperparameters =
            serde_json::from_value(request.hyperparameters.clone())
                .map_err(|e| DomainError::validation(format!("Invalid hyperparameters: {}", e)))?;

        let job_id = JobId::generate();
        let job = TrainingJob::started(job_id.clone());
        self.registry.insert(job.clone());
        info!(job_id = %job_id, "Accepted training job");

        let service = self.clone();
        tokio::spawn(async move {
            service
                .run_in_background(job_id, project, dataset, request, hyperparameters)
                .await;
        });

        Ok(job)
    }

    #[instrument(skip(self))]
    async fn job_status(&self, job_id: &str) -> Result<TrainingJob, DomainError> {
        let job_id = JobId::new(job_id)?;
        self.registry
            .get(&job_id)
            .ok_or_else(|| DomainError::not_found(format!("Training job '{}'", job_id)))
    }

    #[instrument(skip(self))]
    async fn list_runs(&self) -> Result<Vec<TrainingRun>, DomainError> {
        self.runs.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::NewDataset;
    use crate::domain::project::NewProject;
    use crate::domain::training::{
        JobStatus, MockModelTrainer, OutcomeStatus, TrainingOutcome,
    };
    use crate::infrastructure::dataset::InMemoryDatasetRepository;
    use crate::infrastructure::model::InMemoryModelRepository;
    use crate::infrastructure::project::InMemoryProjectRepository;
    use crate::infrastructure::training::InMemoryTrainingRunRepository;
    use std::time::Duration;

    struct Fixture {
        service: TrainingService,
        models: Arc<InMemoryModelRepository>,
        project_id: i64,
        dataset_id: i64,
        _root: tempfile::TempDir,
    }

    async fn fixture(trainer: MockModelTrainer) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let projects: Arc<dyn ProjectRepository> = Arc::new(InMemoryProjectRepository::new());
        let datasets = Arc::new(InMemoryDatasetRepository::new(Arc::clone(&projects)));
        let models = Arc::new(InMemoryModelRepository::new());
        let runs = Arc::new(InMemoryTrainingRunRepository::new());

        let project_dir = root.path().join("demo");
        tokio::fs::create_dir_all(project_dir.join("models"))
            .await
            .unwrap();
        let dataset_dir = project_dir.join("data/plates/v1.0");
        tokio::fs::create_dir_all(&dataset_dir).await.unwrap();

        let project = projects
            .insert(NewProject {
                name: "demo".to_string(),
                description: String::new(),
                path: project_dir.to_string_lossy().into_owned(),
                created_by: "tester".to_string(),
            })
            .await
            .unwrap();
        let dataset = datasets
            .insert(NewDataset {
                project_id: project.id,
                name: "plates".to_string(),
                version: "v1.0".to_string(),
                file_count: 6,
                fingerprint: "fp".to_string(),
                base_path: dataset_dir.to_string_lossy().into_owned(),
                description: String::new(),
                created_by: "tester".to_string(),
            })
            .await
            .unwrap();

        let service = TrainingService::new(
            projects,
            datasets,
            Arc::clone(&models) as Arc<dyn ModelRepository>,
            runs,
            Arc::new(trainer),
            JobRegistry::new(),
        );

        Fixture {
            service,
            models,
            project_id: project.id,
            dataset_id: dataset.id,
            _root: root,
        }
    }

    fn request(project_id: i64, dataset_id: i64) -> StartTrainingRequest {
        StartTrainingRequest {
            project_id,
            dataset_id,
            model_name: None,
            training_reason: "initial training".to_string(),
            hyperparameters: serde_json::json!({"epochs": 2}),
            created_by: "tester".to_string(),
        }
    }

    fn succeeding_trainer() -> MockModelTrainer {
        let mut trainer = MockModelTrainer::new();
        trainer.expect_train().returning(|_, _, _, progress| {
            progress(50);
            progress(100);
            TrainingOutcome::completed(0.12, 0.93, 2)
        });
        trainer
    }

    fn failing_trainer(error: &'static str) -> MockModelTrainer {
        let mut trainer = MockModelTrainer::new();
        trainer.expect_train().returning(move |_, _, _, progress| {
            progress(-1);
            TrainingOutcome::failed(error)
        });
        trainer
    }

    async fn await_terminal(service: &TrainingService, job_id: &str) -> TrainingJob {
        for _ in 0..200 {
            let job = service.job_status(job_id).await.unwrap();
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job never reached a terminal state");
    }

    #[tokio::test]
    async fn test_start_registers_running_job_synchronously() {
        let fx = fixture(succeeding_trainer()).await;

        let job = fx
            .service
            .start(request(fx.project_id, fx.dataset_id))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 0);
        // Immediately queryable by the id the caller got back
        assert!(fx.service.job_status(job.job_id.as_str()).await.is_ok());

        await_terminal(&fx.service, job.job_id.as_str()).await;
    }

    #[tokio::test]
    async fn test_successful_training_records_model_and_run() {
        let fx = fixture(succeeding_trainer()).await;
        let job = fx
            .service
            .start(request(fx.project_id, fx.dataset_id))
            .await
            .unwrap();

        let finished = await_terminal(&fx.service, job.job_id.as_str()).await;

        assert_eq!(finished.status, JobStatus::Completed);
        assert_eq!(finished.progress, 100);
        assert_eq!(finished.model_version.as_deref(), Some("v1.0_model"));

        let model_id = finished.model_id.unwrap();
        let model = fx.models.get(model_id).await.unwrap().unwrap();
        assert_eq!(model.version, "v1.0_model");
        assert_eq!(model.dataset_id, fx.dataset_id.to_string());
        assert_eq!(model.metrics["final_accuracy"], 0.93);

        let runs = fx.service.list_runs().await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, RunStatus::Completed);
        assert_eq!(runs[0].model_id, Some(model_id));
        assert_eq!(runs[0].input_datasets[0].dataset_version, "v1.0");
        assert!(runs[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_retraining_increments_model_version() {
        let mut trainer = MockModelTrainer::new();
        trainer
            .expect_train()
            .times(2)
            .returning(|_, _, _, _| TrainingOutcome::completed(0.1, 0.9, 2));
        let fx = fixture(trainer).await;

        let first = fx
            .service
            .start(request(fx.project_id, fx.dataset_id))
            .await
            .unwrap();
        let first = await_terminal(&fx.service, first.job_id.as_str()).await;
        assert_eq!(first.model_version.as_deref(), Some("v1.0_model"));

        let second = fx
            .service
            .start(request(fx.project_id, fx.dataset_id))
            .await
            .unwrap();
        let second = await_terminal(&fx.service, second.job_id.as_str()).await;
        assert_eq!(second.model_version.as_deref(), Some("v1.1_model"));
    }

    #[tokio::test]
    async fn test_failed_training_marks_job_and_run() {
        let fx = fixture(failing_trainer("no images found")).await;
        let job = fx
            .service
            .start(request(fx.project_id, fx.dataset_id))
            .await
            .unwrap();

        let finished = await_terminal(&fx.service, job.job_id.as_str()).await;

        assert_eq!(finished.status, JobStatus::Failed);
        assert_eq!(finished.error.as_deref(), Some("no images found"));
        assert!(finished.model_id.is_none());

        let runs = fx.service.list_runs().await.unwrap();
        assert_eq!(runs[0].status, RunStatus::Failed);
        assert_eq!(runs[0].error_message.as_deref(), Some("no images found"));
        assert!(runs[0].model_id.is_none());

        assert!(fx.models.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_dataset_is_rejected_without_job() {
        let fx = fixture(MockModelTrainer::new()).await;

        let result = fx.service.start(request(fx.project_id, 999)).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(fx.service.registry.is_empty());
        assert!(fx.service.list_runs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_project_is_rejected_without_job() {
        let fx = fixture(MockModelTrainer::new()).await;

        let result = fx.service.start(request(999, fx.dataset_id)).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(fx.service.registry.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_hyperparameters_are_rejected() {
        let fx = fixture(MockModelTrainer::new()).await;

        let result = fx
            .service
            .start(StartTrainingRequest {
                hyperparameters: serde_json::json!({"epochs": "many"}),
                ..request(fx.project_id, fx.dataset_id)
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(fx.service.registry.is_empty());
    }

    #[tokio::test]
    async fn test_job_status_unknown_id() {
        let fx = fixture(MockModelTrainer::new()).await;

        let missing = fx
            .service
            .job_status(JobId::generate().as_str())
            .await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));

        let malformed = fx.service.job_status("not-a-job").await;
        assert!(matches!(malformed, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_outcome_status_is_exhaustive() {
        // Failed outcomes always carry an error message through the
        // constructor; completed outcomes never do.
        assert_eq!(
            TrainingOutcome::failed("x").status,
            OutcomeStatus::Failed
        );
        assert!(TrainingOutcome::completed(0.1, 0.9, 1).error.is_none());
    }
}
