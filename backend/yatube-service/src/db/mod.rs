/// Database access layer
///
/// One repository trait per entity. `Pg*Repository` types run parameterized
/// queries against PostgreSQL; `memory::MemoryStore` implements every trait
/// in-process for tests and local runs.
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use follow_repo::{FollowRepository, PgFollowRepository};
pub use group_repo::{GroupRepository, PgGroupRepository};
pub use memory::MemoryStore;
pub use post_repo::{PgPostRepository, PostRepository};
pub use user_repo::{PgUserRepository, UserRepository};

use crate::config::StoreConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Result type shared by all repositories
pub type DbResult<T> = std::result::Result<T, sqlx::Error>;

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &StoreConfig) -> DbResult<PgPool> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Creating database pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await
}

/// Apply the embedded migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Health check
pub async fn ping(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
