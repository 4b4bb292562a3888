//! Training run persistence and the live job registry

mod in_memory_repository;
mod postgres_repository;
mod registry;

pub use in_memory_repository::InMemoryTrainingRunRepository;
pub use postgres_repository::PostgresTrainingRunRepository;
pub use registry::JobRegistry;
