//! Trained model domain

mod entity;
mod repository;

pub use entity::{Model, NewModel};
pub use repository::ModelRepository;
