//! Project repository implementations

mod in_memory_repository;
mod postgres_repository;

pub use in_memory_repository::InMemoryProjectRepository;
pub use postgres_repository::PostgresProjectRepository;
