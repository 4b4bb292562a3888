//! Domain layer: entities, value types and repository traits

pub mod dataset;
pub mod error;
pub mod model;
pub mod project;
pub mod training;
pub mod versioning;

pub use dataset::{Dataset, DatasetRepository, DatasetWithProject, NewDataset};
pub use error::DomainError;
pub use model::{Model, ModelRepository, NewModel};
pub use project::{NewProject, Project, ProjectRepository, ProjectStatus, ProjectUpdate};
pub use training::{
    Hyperparameters, InputDatasetSnapshot, JobId, JobStatus, ModelTrainer, NewTrainingRun,
    OutcomeStatus, ProgressFn, RunStatus, TrainingJob, TrainingOutcome, TrainingRun,
    TrainingRunRepository,
};
pub use versioning::{next_model_version, DatasetVersion};
