/// Blog Service Library
///
/// Posts, groups, comments, follows and paginated feeds for a small social
/// blogging site. Identity comes from an upstream gateway; everything else is
/// owned here.
///
/// # Modules
///
/// - `handlers`: HTTP endpoints under `/api/v1`
/// - `middleware`: request identity extraction
/// - `models`: rows, forms, read models and pagination
/// - `services`: business logic layer
/// - `db`: the `BlogStore` seam with PostgreSQL and in-memory implementations
/// - `cache`: invalidate-on-write listing cache
/// - `error`: error types and HTTP mapping
/// - `config`: environment configuration
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::BlogServices;
