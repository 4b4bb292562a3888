//! Dataset domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One version of a dataset. Rows sharing (project_id, name) form a version
/// chain ordered by creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub project_id: i64,
    /// Stable across versions of the same chain
    pub name: String,
    /// `v<major>.<minor>`, unique within (project_id, name)
    pub version: String,
    pub file_count: i32,
    /// Content fingerprint over the materialized files
    pub fingerprint: String,
    /// Physical directory holding `images/`, `labels/` and optional yaml
    pub base_path: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a dataset version
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub project_id: i64,
    pub name: String,
    pub version: String,
    pub file_count: i32,
    pub fingerprint: String,
    pub base_path: String,
    pub description: String,
    pub created_by: String,
}

/// Dataset joined with its owning project's name, for listings
#[derive(Debug, Clone, Serialize)]
pub struct DatasetWithProject {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub project_name: String,
}
