/// Database access layer
///
/// This module provides:
/// - `BlogStore`: the storage seam every service talks to
/// - `PgStore`: PostgreSQL implementation (sqlx)
/// - `MemoryStore`: in-process implementation with the same referential rules
/// - Pool creation and embedded migrations
pub mod comment_repo;
pub mod memory;
pub mod pool;
pub mod post_repo;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations};
pub use postgres::PgStore;
pub use store::BlogStore;

#[cfg(test)]
pub use store::MockBlogStore;
