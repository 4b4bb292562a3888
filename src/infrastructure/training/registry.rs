//! In-memory registry of live training jobs
//!
//! Job state is process-scoped; a restart loses all job entries while the
//! persisted training runs survive in the database. Uses a std RwLock so the
//! trainer's synchronous progress callback can update jobs directly; the lock
//! is never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::training::{JobId, TrainingJob};

/// Owns all transient training job records. Cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<String, TrainingJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job under its id, replacing any previous entry
    pub fn insert(&self, job: TrainingJob) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.job_id.as_str().to_string(), job);
    }

    pub fn get(&self, job_id: &JobId) -> Option<TrainingJob> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(job_id.as_str()).cloned()
    }

    /// Mutate a job in place; no-op when the id is unknown
    pub fn update<F>(&self, job_id: &JobId, apply: F)
    where
        F: FnOnce(&mut TrainingJob),
    {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        if let Some(job) = jobs.get_mut(job_id.as_str()) {
            apply(job);
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
