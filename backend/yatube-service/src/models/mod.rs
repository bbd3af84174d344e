/// Data models for yatube-service
///
/// Rows carry the usernames they reference so that representations can be
/// rendered without a second lookup.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::permissions::Owned;

/// Identity known to the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// Community that posts may be published into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author_id: Uuid,
    /// Username of `author_id`
    pub author: String,
    pub image: Option<String>,
    pub group_id: Option<i64>,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    pub image: Option<String>,
    pub group_id: Option<i64>,
}

/// Fields to overwrite on a post; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
    pub group_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    /// Username of `author_id`
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
}

/// Directed edge: `user` follows `following`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub following_id: Uuid,
    pub following_username: String,
}

#[derive(Debug, Clone, Copy)]
pub struct NewFollow {
    pub user_id: Uuid,
    pub following_id: Uuid,
}

impl Owned for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}
