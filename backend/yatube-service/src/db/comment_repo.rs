use super::DbResult;
use crate::models::{Comment, NewComment};
use async_trait::async_trait;
use sqlx::PgPool;

/// Comments are always addressed through their parent post.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_by_post(&self, post_id: i64) -> DbResult<Vec<Comment>>;

    /// Finds comment `id` only if it belongs to `post_id`.
    async fn find_in_post(&self, post_id: i64, id: i64) -> DbResult<Option<Comment>>;

    async fn insert(&self, comment: NewComment) -> DbResult<Comment>;

    async fn update_text(&self, id: i64, text: &str) -> DbResult<Option<Comment>>;

    async fn delete(&self, id: i64) -> DbResult<bool>;
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_by_post(&self, post_id: i64) -> DbResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author, c.text, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_in_post(&self, post_id: i64, id: i64) -> DbResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author, c.text, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1 AND c.post_id = $2
            "#,
        )
        .bind(id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert(&self, comment: NewComment) -> DbResult<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, text, created)
                VALUES ($1, $2, $3, NOW())
                RETURNING id, post_id, author_id, text, created
            )
            SELECT i.id, i.post_id, i.author_id, u.username AS author, i.text, i.created
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.text)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_text(&self, id: i64, text: &str) -> DbResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            WITH updated AS (
                UPDATE comments
                SET text = $2
                WHERE id = $1
                RETURNING id, post_id, author_id, text, created
            )
            SELECT d.id, d.post_id, d.author_id, u.username AS author, d.text, d.created
            FROM updated d
            JOIN users u ON u.id = d.author_id
            "#,
        )
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: i64) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
