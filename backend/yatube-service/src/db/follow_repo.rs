use super::DbResult;
use crate::models::{Follow, NewFollow};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Edges whose follower is `user_id`, optionally restricted to one
    /// followed username (case-insensitive exact match).
    async fn list_by_user(
        &self,
        user_id: Uuid,
        following_username: Option<&str>,
    ) -> DbResult<Vec<Follow>>;

    async fn exists(&self, user_id: Uuid, following_id: Uuid) -> DbResult<bool>;

    /// Returns `None` if the pair already exists.
    async fn insert(&self, follow: NewFollow) -> DbResult<Option<Follow>>;
}

#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        following_username: Option<&str>,
    ) -> DbResult<Vec<Follow>> {
        sqlx::query_as::<_, Follow>(
            r#"
            SELECT f.id, f.user_id, u.username, f.following_id, t.username AS following_username
            FROM follows f
            JOIN users u ON u.id = f.user_id
            JOIN users t ON t.id = f.following_id
            WHERE f.user_id = $1
              AND ($2::text IS NULL OR LOWER(t.username) = LOWER($2))
            ORDER BY f.id ASC
            "#,
        )
        .bind(user_id)
        .bind(following_username)
        .fetch_all(&self.pool)
        .await
    }

    async fn exists(&self, user_id: Uuid, following_id: Uuid) -> DbResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2)",
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert(&self, follow: NewFollow) -> DbResult<Option<Follow>> {
        // Concurrent duplicates are settled by the unique constraint
        sqlx::query_as::<_, Follow>(
            r#"
            WITH inserted AS (
                INSERT INTO follows (user_id, following_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, following_id) DO NOTHING
                RETURNING id, user_id, following_id
            )
            SELECT i.id, i.user_id, u.username, i.following_id, t.username AS following_username
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            JOIN users t ON t.id = i.following_id
            "#,
        )
        .bind(follow.user_id)
        .bind(follow.following_id)
        .fetch_optional(&self.pool)
        .await
    }
}
