//! Training run and transient job entities

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

/// Job ids are `job-{uuid}`
static JOB_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^job-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Validated training job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if !JOB_ID_PATTERN.is_match(&id) {
            return Err(DomainError::validation(format!(
                "Invalid job id '{}': must be in format job-{{uuid}}",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(format!("job-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live status of a transient training job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Transient, in-memory record of one training execution. Never persisted;
/// lost on process restart together with the registry that owns it.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingJob {
    pub job_id: JobId,
    pub status: JobStatus,
    /// 0..=100
    pub progress: i32,
    pub model_id: Option<i64>,
    pub model_version: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrainingJob {
    /// A freshly accepted job starts out running; there is no queue between
    /// acceptance and dispatch.
    pub fn started(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::Running,
            progress: 0,
            model_id: None,
            model_version: None,
            message: "Training started".to_string(),
            error: None,
        }
    }

    pub fn set_progress(&mut self, progress: i32) {
        self.progress = progress;
        self.message = format!("Training progress: {}%", progress);
    }

    pub fn complete(&mut self, model_id: i64, model_version: String) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.model_id = Some(model_id);
        self.model_version = Some(model_version);
        self.message = "Training completed successfully".to_string();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.status = JobStatus::Failed;
        self.message = format!("Training failed: {}", error);
        self.error = Some(error);
    }
}

/// Persisted status of a training run row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Running,
        }
    }
}

/// By-value snapshot of a dataset as it was at training time. Kept on the run
/// row because the dataset chain may later be superseded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDatasetSnapshot {
    pub dataset_id: String,
    pub dataset_name: String,
    pub dataset_version: String,
    pub dataset_path: String,
}

/// Persisted record of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRun {
    pub id: i64,
    pub job_id: String,
    pub project_id: i64,
    pub model_id: Option<i64>,
    pub input_datasets: Vec<InputDatasetSnapshot>,
    pub training_reason: String,
    pub hyperparameters: Value,
    pub status: RunStatus,
    pub created_by: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Insert payload for a training run
#[derive(Debug, Clone)]
pub struct NewTrainingRun {
    pub job_id: String,
    pub project_id: i64,
    pub model_id: Option<i64>,
    pub input_datasets: Vec<InputDatasetSnapshot>,
    pub training_reason: String,
    pub hyperparameters: Value,
    pub status: RunStatus,
    pub created_by: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}
