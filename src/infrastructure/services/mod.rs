//! Infrastructure services

mod dataset_service;
mod model_service;
mod project_service;
mod training_service;

pub use dataset_service::{
    DatasetDetails, DatasetService, DatasetServiceTrait, UploadDatasetRequest, UploadedFile,
};
pub use model_service::{ModelService, ModelServiceTrait};
pub use project_service::{
    CreateProjectRequest, ProjectService, ProjectServiceTrait, UpdateProjectRequest,
};
pub use training_service::{StartTrainingRequest, TrainingService, TrainingServiceTrait};
