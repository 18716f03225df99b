pub mod file_repo;
pub use file_repo::JsonFileRepository;
pub mod pg_repo;
pub use pg_repo::PgRepository;
pub mod repository;
pub use repository::{CustomOptionsRepository, PropertyRepository};
