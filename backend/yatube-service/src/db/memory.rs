//! In-process entity store.
//!
//! Mirrors the PostgreSQL schema closely enough for the HTTP layer to behave
//! identically: rows whose user is unknown are invisible (inner join), deleting
//! a post removes its comments, and follow pairs are unique.

use super::{
    CommentRepository, DbResult, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};
use crate::models::{
    Comment, Follow, Group, NewComment, NewFollow, NewGroup, NewPost, Post, PostChanges, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PostRow {
    text: String,
    author_id: Uuid,
    image: Option<String>,
    group_id: Option<i64>,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    post_id: i64,
    author_id: Uuid,
    text: String,
    created: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, String>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, PostRow>,
    comments: BTreeMap<i64, CommentRow>,
    follows: BTreeMap<i64, NewFollow>,
    group_seq: i64,
    post_seq: i64,
    comment_seq: i64,
    follow_seq: i64,
}

impl Tables {
    fn username(&self, id: &Uuid) -> Option<String> {
        self.users.get(id).cloned()
    }

    fn post(&self, id: i64, row: &PostRow) -> Option<Post> {
        Some(Post {
            id,
            text: row.text.clone(),
            author_id: row.author_id,
            author: self.username(&row.author_id)?,
            image: row.image.clone(),
            group_id: row.group_id,
            pub_date: row.pub_date,
        })
    }

    fn comment(&self, id: i64, row: &CommentRow) -> Option<Comment> {
        Some(Comment {
            id,
            post_id: row.post_id,
            author_id: row.author_id,
            author: self.username(&row.author_id)?,
            text: row.text.clone(),
            created: row.created,
        })
    }

    fn follow(&self, id: i64, row: &NewFollow) -> Option<Follow> {
        Some(Follow {
            id,
            user_id: row.user_id,
            username: self.username(&row.user_id)?,
            following_id: row.following_id,
            following_username: self.username(&row.following_id)?,
        })
    }

    fn sorted_posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter_map(|(id, row)| self.post(*id, row))
            .collect();
        posts.sort_by(|a, b| a.pub_date.cmp(&b.pub_date).then(a.id.cmp(&b.id)));
        posts
    }
}

/// Every repository trait backed by one lock-protected set of tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Placeholder for a mirror row whose username now belongs to another identity.
fn released_username(name: &str, id: &Uuid) -> String {
    let kept: String = name.chars().take(100).collect();
    format!("{}#{}", kept, id)
}

fn missing_user(id: Uuid) -> sqlx::Error {
    sqlx::Error::Protocol(format!("user {} does not exist", id))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|(_, name)| name.as_str() == username)
            .map(|(id, name)| User {
                id: *id,
                username: name.clone(),
            }))
    }

    async fn upsert(&self, user: &User) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        for (id, name) in tables.users.iter_mut() {
            if *id != user.id && *name == user.username {
                *name = released_username(name, id);
            }
        }
        tables.users.insert(user.id, user.username.clone());
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn list(&self) -> DbResult<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(&id).cloned())
    }

    async fn insert(&self, group: NewGroup) -> DbResult<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(sqlx::Error::Protocol(format!(
                "group slug {} already exists",
                group.slug
            )));
        }
        tables.group_seq += 1;
        let group = Group {
            id: tables.group_seq,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list(&self, limit: Option<i64>, offset: i64) -> DbResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let skipped = tables
            .sorted_posts()
            .into_iter()
            .skip(offset.max(0) as usize);
        Ok(match limit {
            Some(limit) => skipped.take(limit.max(0) as usize).collect(),
            None => skipped.collect(),
        })
    }

    async fn count(&self) -> DbResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_posts().len() as i64)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|row| tables.post(id, row)))
    }

    async fn insert(&self, post: NewPost) -> DbResult<Post> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(missing_user(post.author_id));
        }
        tables.post_seq += 1;
        let id = tables.post_seq;
        let row = PostRow {
            text: post.text,
            author_id: post.author_id,
            image: post.image,
            group_id: post.group_id,
            pub_date: Utc::now(),
        };
        tables.posts.insert(id, row.clone());
        tables.post(id, &row).ok_or_else(|| missing_user(post.author_id))
    }

    async fn update(&self, id: i64, changes: PostChanges) -> DbResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(text) = changes.text {
            row.text = text;
        }
        if let Some(image) = changes.image {
            row.image = image;
        }
        if let Some(group_id) = changes.group_id {
            row.group_id = group_id;
        }
        let row = row.clone();
        Ok(tables.post(id, &row))
    }

    async fn delete(&self, id: i64) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.posts.remove(&id).is_some();
        if removed {
            tables.comments.retain(|_, c| c.post_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_by_post(&self, post_id: i64) -> DbResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|(_, row)| row.post_id == post_id)
            .filter_map(|(id, row)| tables.comment(*id, row))
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn find_in_post(&self, post_id: i64, id: i64) -> DbResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&id)
            .filter(|row| row.post_id == post_id)
            .and_then(|row| tables.comment(id, row)))
    }

    async fn insert(&self, comment: NewComment) -> DbResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(sqlx::Error::Protocol(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        if !tables.users.contains_key(&comment.author_id) {
            return Err(missing_user(comment.author_id));
        }
        tables.comment_seq += 1;
        let id = tables.comment_seq;
        let row = CommentRow {
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        tables.comments.insert(id, row.clone());
        tables
            .comment(id, &row)
            .ok_or_else(|| missing_user(comment.author_id))
    }

    async fn update_text(&self, id: i64, text: &str) -> DbResult<Option<Comment>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.comments.get_mut(&id) else {
            return Ok(None);
        };
        row.text = text.to_string();
        let row = row.clone();
        Ok(tables.comment(id, &row))
    }

    async fn delete(&self, id: i64) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        following_username: Option<&str>,
    ) -> DbResult<Vec<Follow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|(_, row)| row.user_id == user_id)
            .filter_map(|(id, row)| tables.follow(*id, row))
            .filter(|f| {
                following_username.map_or(true, |name| {
                    f.following_username.to_lowercase() == name.to_lowercase()
                })
            })
            .collect())
    }

    async fn exists(&self, user_id: Uuid, following_id: Uuid) -> DbResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.following_id == following_id))
    }

    async fn insert(&self, follow: NewFollow) -> DbResult<Option<Follow>> {
        let mut tables = self.tables.write().await;
        if follow.user_id == follow.following_id {
            return Err(sqlx::Error::Protocol(
                "follows violates check constraint ck_follows_no_self_follow".to_string(),
            ));
        }
        let duplicate = tables
            .follows
            .values()
            .any(|f| f.user_id == follow.user_id && f.following_id == follow.following_id);
        if duplicate {
            return Ok(None);
        }
        for id in [follow.user_id, follow.following_id] {
            if !tables.users.contains_key(&id) {
                return Err(missing_user(id));
            }
        }
        tables.follow_seq += 1;
        let id = tables.follow_seq;
        tables.follows.insert(id, follow);
        Ok(tables.follow(id, &follow))
    }
}
