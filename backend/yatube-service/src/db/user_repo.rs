use super::DbResult;
use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<User>>;

    /// Record an identity verified from a bearer token.
    async fn upsert(&self, user: &User) -> DbResult<()>;
}

/// PostgreSQL mirror of identity-provider users
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    async fn upsert(&self, user: &User) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        // The identity provider owns usernames: a stale row holding this
        // name under another id gives it up.
        sqlx::query(
            r#"
            UPDATE users
            SET username = LEFT(username, 100) || '#' || id::text,
                updated_at = NOW()
            WHERE username = $2 AND id <> $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                updated_at = NOW()
            WHERE users.username <> EXCLUDED.username
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
