//! Central application state
//!
//! Handlers reach every repository through `AppState`. The repositories are
//! trait objects so the same handlers run against PostgreSQL or the
//! in-process store.

use sqlx::PgPool;
use std::sync::Arc;

use crate::db::{
    CommentRepository, FollowRepository, GroupRepository, MemoryStore, PgCommentRepository,
    PgFollowRepository, PgGroupRepository, PgPostRepository, PgUserRepository, PostRepository,
    UserRepository,
};
use crate::middleware::JwtVerifier;
use crate::pagination::Paginator;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    /// `None` when no public key is configured: every bearer token is refused
    pub jwt: Option<Arc<JwtVerifier>>,
    pub paginator: Paginator,
    /// Present for the PostgreSQL backend, used by the readiness check
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn postgres(pool: PgPool, jwt: Option<Arc<JwtVerifier>>, paginator: Paginator) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool.clone())),
            jwt,
            paginator,
            db: Some(pool),
        }
    }

    pub fn in_memory(
        store: Arc<MemoryStore>,
        jwt: Option<Arc<JwtVerifier>>,
        paginator: Paginator,
    ) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
            jwt,
            paginator,
            db: None,
        }
    }
}
