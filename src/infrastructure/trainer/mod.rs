//! Simulated model trainer
//!
//! Stands in for a real training backend: it scans the materialized dataset,
//! walks a fake epoch loop with plausible loss/accuracy curves and writes an
//! artifact plus a training history file. Failures are reported through the
//! progress callback as a negative sentinel and returned as a failed outcome,
//! never as an Err across the trainer boundary.

use std::path::Path;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::domain::training::{Hyperparameters, ModelTrainer, ProgressFn, TrainingOutcome};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Progress value reported through the callback when training fails
pub const PROGRESS_FAILED: i32 = -1;

/// Trainer that simulates an epoch loop over a materialized dataset directory
#[derive(Debug, Clone)]
pub struct SimulatedTrainer {
    /// Pause per simulated epoch
    epoch_delay: Duration,
}

impl SimulatedTrainer {
    pub fn new() -> Self {
        Self {
            epoch_delay: Duration::from_millis(100),
        }
    }

    pub fn with_epoch_delay(mut self, delay: Duration) -> Self {
        self.epoch_delay = delay;
        self
    }

    async fn run(
        &self,
        dataset_dir: &Path,
        output_path: &Path,
        hyperparameters: &Hyperparameters,
        progress: &ProgressFn,
    ) -> Result<TrainingOutcome, String> {
        if !dataset_dir.is_dir() {
            return Err(format!(
                "Dataset directory '{}' does not exist",
                dataset_dir.display()
            ));
        }

        let config = read_dataset_config(dataset_dir).await;
        let num_classes = config
            .as_ref()
            .and_then(class_count)
            .unwrap_or(hyperparameters.num_classes);

        let total_samples = count_images(dataset_dir).await?;
        if total_samples == 0 {
            return Err(format!(
                "No image files found under '{}'",
                dataset_dir.display()
            ));
        }

        let splits = hyperparameters.split_counts(total_samples);
        info!(
            total_samples,
            train = splits.train,
            validation = splits.validation,
            test = splits.test,
            num_classes,
            "Starting simulated training"
        );

        let epochs = hyperparameters.epochs.max(1);
        let mut history = Vec::with_capacity(epochs as usize);
        let mut loss = 0.0;
        let mut accuracy = 0.0;

        for epoch in 0..epochs {
            sleep(self.epoch_delay).await;

            // Exponential-ish convergence toward a fixed asymptote
            let fraction = (epoch + 1) as f64 / epochs as f64;
            loss = 2.0 * (1.0 - fraction) + 0.08;
            accuracy = 0.95 * fraction;
            history.push(json!({
                "epoch": epoch + 1,
                "loss": loss,
                "accuracy": accuracy,
            }));

            // Epochs cover 0..=90; the final 10% is artifact serialization
            progress(((epoch + 1) * 90 / epochs) as i32);
        }

        write_artifact(output_path, hyperparameters, num_classes, loss, accuracy)
            .await
            .map_err(|e| format!("Failed to write model artifact: {}", e))?;
        write_history(output_path, &history)
            .await
            .map_err(|e| format!("Failed to write training history: {}", e))?;

        progress(100);
        Ok(TrainingOutcome::completed(loss, accuracy, epochs))
    }
}

impl Default for SimulatedTrainer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelTrainer for SimulatedTrainer {
    async fn train(
        &self,
        dataset_dir: &Path,
        output_path: &Path,
        hyperparameters: &Hyperparameters,
        progress: ProgressFn,
    ) -> TrainingOutcome {
        match self.run(dataset_dir, output_path, hyperparameters, &progress).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%error, "Simulated training failed");
                progress(PROGRESS_FAILED);
                TrainingOutcome::failed(error)
            }
        }
    }
}

/// First top-level yaml file parsed as a dataset config, if any
async fn read_dataset_config(dataset_dir: &Path) -> Option<serde_yaml::Value> {
    let mut entries = tokio::fs::read_dir(dataset_dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if path.is_file() && is_yaml {
            let raw = tokio::fs::read_to_string(&path).await.ok()?;
            match serde_yaml::from_str(&raw) {
                Ok(value) => return Some(value),
                Err(err) => {
                    warn!(path = %path.display(), %err, "Ignoring unparseable dataset config");
                    return None;
                }
            }
        }
    }
    None
}

/// Class count from an `nc` key or the length of a `names` list
fn class_count(config: &serde_yaml::Value) -> Option<u32> {
    if let Some(nc) = config.get("nc").and_then(|v| v.as_u64()) {
        return Some(nc as u32);
    }
    config
        .get("names")
        .and_then(|v| v.as_sequence())
        .map(|names| names.len() as u32)
}

/// Image files under `images/`, falling back to the directory root when the
/// dataset was laid out flat
async fn count_images(dataset_dir: &Path) -> Result<usize, String> {
    let images_dir = dataset_dir.join("images");
    let scan_dir = if images_dir.is_dir() {
        images_dir
    } else {
        dataset_dir.to_path_buf()
    };

    let mut count = 0;
    let mut entries = tokio::fs::read_dir(&scan_dir)
        .await
        .map_err(|e| format!("Failed to read '{}': {}", scan_dir.display(), e))?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_image {
            count += 1;
        }
    }
    Ok(count)
}

async fn write_artifact(
    output_path: &Path,
    hyperparameters: &Hyperparameters,
    num_classes: u32,
    final_loss: f64,
    final_accuracy: f64,
) -> std::io::Result<()> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let artifact = json!({
        "architecture": hyperparameters.model_architecture,
        "num_classes": num_classes,
        "optimizer": hyperparameters.optimizer,
        "loss_function": hyperparameters.loss_function,
        "learning_rate": hyperparameters.learning_rate,
        "final_loss": final_loss,
        "final_accuracy": final_accuracy,
    });
    tokio::fs::write(output_path, serde_json::to_vec_pretty(&artifact)?).await
}

async fn write_history(output_path: &Path, history: &[serde_json::Value]) -> std::io::Result<()> {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let history_path = output_path.with_file_name(format!("{}_history.json", stem));
    tokio::fs::write(&history_path, serde_json::to_vec_pretty(&history)?).await
}
