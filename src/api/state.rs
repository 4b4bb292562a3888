//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::{
    DatasetServiceTrait, ModelServiceTrait, ProjectServiceTrait, TrainingServiceTrait,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub project_service: Arc<dyn ProjectServiceTrait>,
    pub dataset_service: Arc<dyn DatasetServiceTrait>,
    pub model_service: Arc<dyn ModelServiceTrait>,
    pub training_service: Arc<dyn TrainingServiceTrait>,
}
