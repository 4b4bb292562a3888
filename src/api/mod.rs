//! API layer - HTTP endpoints

pub mod datasets;
pub mod files;
pub mod health;
pub mod models;
pub mod projects;
pub mod router;
pub mod state;
pub mod training;
pub mod types;

pub use router::create_router;
pub use state::AppState;
