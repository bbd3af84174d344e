/// Yatube Service Library
///
/// Serves posts, groups, comments and follow relationships over HTTP/JSON.
/// Writes are restricted to authenticated identities, and only the author of a
/// post or comment may change or remove it.
///
/// # Modules
///
/// - `handlers`: Resource controllers (posts, comments, groups, follows, health)
/// - `serializers`: Representations, payload parsing and field validation
/// - `middleware`: Bearer token identity, access control, request metrics
/// - `db`: Repository traits with PostgreSQL and in-memory implementations
/// - `pagination`: Limit/offset windowing of list responses
/// - `error`: Error types and their HTTP mapping
/// - `config`: Configuration management
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod serializers;

pub use app_state::AppState;
pub use config::Config;
pub use error::{AppError, FieldErrors, Result};
