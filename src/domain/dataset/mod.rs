//! Dataset domain

mod entity;
mod repository;

pub use entity::{Dataset, DatasetWithProject, NewDataset};
pub use repository::DatasetRepository;
