//! Model trainer collaborator contract

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Progress callback invoked by the trainer with 0..=100, or a negative
/// sentinel on internal training failure.
pub type ProgressFn = Arc<dyn Fn(i32) + Send + Sync>;

/// Hyperparameters recognized by the trainer. Unknown keys in incoming JSON
/// are ignored; absent keys take these defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub model_architecture: String,
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub num_classes: u32,
    pub optimizer: String,
    pub loss_function: String,
    /// Percentages; expected to sum to ~100. No normalization is applied.
    pub train_split: u32,
    pub validation_split: u32,
    pub test_split: u32,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            model_architecture: "resnet".to_string(),
            epochs: 10,
            batch_size: 32,
            learning_rate: 0.001,
            num_classes: 10,
            optimizer: "adam".to_string(),
            loss_function: "cross_entropy".to_string(),
            train_split: 70,
            validation_split: 20,
            test_split: 10,
        }
    }
}

/// Sample counts for one three-way split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

impl Hyperparameters {
    /// Single source of truth for the three-way split: validation and test
    /// are taken from their percentages, train is the remainder.
    pub fn split_counts(&self, total: usize) -> SplitCounts {
        let validation = total * self.validation_split as usize / 100;
        let test = total * self.test_split as usize / 100;
        SplitCounts {
            train: total - validation - test,
            validation,
            test,
        }
    }
}

/// Terminal status of one trainer invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    Failed,
}

/// Result record returned by the trainer collaborator
#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    pub status: OutcomeStatus,
    pub final_loss: f64,
    pub final_accuracy: f64,
    pub epochs_completed: u32,
    pub error: Option<String>,
}

impl TrainingOutcome {
    pub fn completed(final_loss: f64, final_accuracy: f64, epochs_completed: u32) -> Self {
        Self {
            status: OutcomeStatus::Completed,
            final_loss,
            final_accuracy,
            epochs_completed,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            final_loss: 0.0,
            final_accuracy: 0.0,
            epochs_completed: 0,
            error: Some(error.into()),
        }
    }
}

/// External collaborator that turns a materialized dataset directory into a
/// trained artifact. Implementations must report progress through the
/// callback and must not panic across the boundary; failures come back as a
/// failed outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelTrainer: Send + Sync + Debug {
    async fn train(
        &self,
        dataset_dir: &Path,
        output_path: &Path,
        hyperparameters: &Hyperparameters,
        progress: ProgressFn,
    ) -> TrainingOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperparameter_defaults() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.epochs, 10);
        assert_eq!(hp.batch_size, 32);
        assert_eq!(hp.train_split + hp.validation_split + hp.test_split, 100);
    }

    #[test]
    fn test_hyperparameters_from_partial_json() {
        let hp: Hyperparameters =
            serde_json::from_value(serde_json::json!({"epochs": 3, "optimizer": "sgd"})).unwrap();
        assert_eq!(hp.epochs, 3);
        assert_eq!(hp.optimizer, "sgd");
        assert_eq!(hp.batch_size, 32);
    }

    #[test]
    fn test_split_counts_remainder_goes_to_train() {
        let hp = Hyperparameters::default();
        let splits = hp.split_counts(103);

        assert_eq!(splits.validation, 20);
        assert_eq!(splits.test, 10);
        assert_eq!(splits.train, 73);
        assert_eq!(splits.train + splits.validation + splits.test, 103);
    }

    #[test]
    fn test_split_counts_small_total() {
        let hp = Hyperparameters::default();
        let splits = hp.split_counts(3);

        // Percentages truncate to zero; everything lands in train
        assert_eq!(splits.validation, 0);
        assert_eq!(splits.test, 0);
        assert_eq!(splits.train, 3);
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = TrainingOutcome::completed(0.42, 0.91, 10);
        assert_eq!(ok.status, OutcomeStatus::Completed);
        assert!(ok.error.is_none());

        let failed = TrainingOutcome::failed("no images found");
        assert_eq!(failed.status, OutcomeStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("no images found"));
    }
}
