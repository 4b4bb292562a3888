//! Model repository implementations

mod in_memory_repository;
mod postgres_repository;

pub use in_memory_repository::InMemoryModelRepository;
pub use postgres_repository::PostgresModelRepository;
