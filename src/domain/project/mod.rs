//! Project domain

mod entity;
mod repository;

pub use entity::{NewProject, Project, ProjectStatus, ProjectUpdate};
pub use repository::ProjectRepository;
