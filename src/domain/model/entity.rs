//! Trained model domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A trained model artifact and its lineage metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub project_id: i64,
    /// Dataset reference stored as the literal id string. The dataset fields
    /// that mattered at training time are snapshotted on the training run, so
    /// this is not required to join against a live row.
    pub dataset_id: String,
    pub name: String,
    /// Derived from the dataset version, e.g. `v1.0_model`
    pub version: String,
    pub description: String,
    /// Path of the serialized weights under `<project>/models/`
    pub artifact_path: String,
    pub framework: String,
    pub hyperparameters: Value,
    pub metrics: Value,
    pub fingerprint: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a model
#[derive(Debug, Clone)]
pub struct NewModel {
    pub project_id: i64,
    pub dataset_id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub artifact_path: String,
    pub framework: String,
    pub hyperparameters: Value,
    pub metrics: Value,
    pub fingerprint: String,
    pub created_by: String,
}
