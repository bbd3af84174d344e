use super::DbResult;
use crate::models::{NewPost, Post, PostChanges};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts ordered by publication date; `limit = None` returns everything
    /// from `offset` on.
    async fn list(&self, limit: Option<i64>, offset: i64) -> DbResult<Vec<Post>>;

    async fn count(&self) -> DbResult<i64>;

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Post>>;

    async fn insert(&self, post: NewPost) -> DbResult<Post>;

    /// Returns `None` when the post no longer exists.
    async fn update(&self, id: i64, changes: PostChanges) -> DbResult<Option<Post>>;

    /// Returns true if a row was removed.
    async fn delete(&self, id: i64) -> DbResult<bool>;
}

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list(&self, limit: Option<i64>, offset: i64) -> DbResult<Vec<Post>> {
        // LIMIT NULL means no limit in PostgreSQL
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.text, p.author_id, u.username AS author, p.image, p.group_id, p.pub_date
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.pub_date ASC, p.id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.text, p.author_id, u.username AS author, p.image, p.group_id, p.pub_date
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert(&self, post: NewPost) -> DbResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (text, author_id, image, group_id, pub_date)
                VALUES ($1, $2, $3, $4, NOW())
                RETURNING id, text, author_id, image, group_id, pub_date
            )
            SELECT i.id, i.text, i.author_id, u.username AS author, i.image, i.group_id, i.pub_date
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(post.text)
        .bind(post.author_id)
        .bind(post.image)
        .bind(post.group_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update(&self, id: i64, changes: PostChanges) -> DbResult<Option<Post>> {
        let (set_image, image) = match changes.image {
            Some(image) => (true, image),
            None => (false, None),
        };
        let (set_group, group_id) = match changes.group_id {
            Some(group_id) => (true, group_id),
            None => (false, None),
        };

        sqlx::query_as::<_, Post>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET text = COALESCE($2, text),
                    image = CASE WHEN $3 THEN $4 ELSE image END,
                    group_id = CASE WHEN $5 THEN $6 ELSE group_id END
                WHERE id = $1
                RETURNING id, text, author_id, image, group_id, pub_date
            )
            SELECT d.id, d.text, d.author_id, u.username AS author, d.image, d.group_id, d.pub_date
            FROM updated d
            JOIN users u ON u.id = d.author_id
            "#,
        )
        .bind(id)
        .bind(changes.text)
        .bind(set_image)
        .bind(image)
        .bind(set_group)
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: i64) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
