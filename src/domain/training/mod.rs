//! Training domain: persisted runs, transient jobs, trainer contract

mod entity;
mod repository;
mod trainer;

pub use entity::{
    InputDatasetSnapshot, JobId, JobStatus, NewTrainingRun, RunStatus, TrainingJob, TrainingRun,
};
pub use repository::TrainingRunRepository;
#[cfg(test)]
pub use trainer::MockModelTrainer;
pub use trainer::{
    Hyperparameters, ModelTrainer, OutcomeStatus, ProgressFn, SplitCounts, TrainingOutcome,
};
