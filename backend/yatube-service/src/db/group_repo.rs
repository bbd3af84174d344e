use super::DbResult;
use crate::models::{Group, NewGroup};
use async_trait::async_trait;
use sqlx::PgPool;

/// Groups are managed outside the API; the service only reads them.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn list(&self) -> DbResult<Vec<Group>>;

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Group>>;

    /// Used by administrative seeding and fixtures.
    async fn insert(&self, group: NewGroup) -> DbResult<Group>;
}

#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn list(&self) -> DbResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert(&self, group: NewGroup) -> DbResult<Group> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(group.title)
        .bind(group.slug)
        .bind(group.description)
        .fetch_one(&self.pool)
        .await
    }
}
