/// Follow handlers - list and create edges of the acting identity
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

use super::parse_body;
use crate::app_state::AppState;
use crate::error::{AppError, Result, NON_FIELD_ERRORS};
use crate::middleware::permissions::check_permission;
use crate::middleware::CurrentUser;
use crate::serializers::follow::DUPLICATE_FOLLOW;
use crate::serializers::{FollowResource, Resource, WritableResource, WriteMode};

type Policy = <FollowResource as Resource>::Permission;

#[derive(Debug, Default, Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}

/// How `search` narrows the follow list.
#[derive(Debug, PartialEq, Eq)]
enum SearchFilter {
    All,
    Username(String),
    /// Terms disagree, so no username can equal all of them
    Nothing,
}

/// Terms are separated by whitespace or commas; an edge matches when the
/// followed username equals every term, ignoring case.
fn search_filter(search: Option<&str>) -> SearchFilter {
    let mut terms = search
        .unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|term| term.replace('\0', ""))
        .filter(|term| !term.is_empty());

    let Some(first) = terms.next() else {
        return SearchFilter::All;
    };
    let folded = first.to_lowercase();
    if terms.all(|term| term.to_lowercase() == folded) {
        SearchFilter::Username(first)
    } else {
        SearchFilter::Nothing
    }
}

/// Edges where the acting identity is the follower
pub async fn list_follows(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<FollowQuery>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let actor = user.require()?;

    let follows = match search_filter(query.search.as_deref()) {
        SearchFilter::All => state.follows.list_by_user(actor.id, None).await?,
        SearchFilter::Username(username) => {
            state
                .follows
                .list_by_user(actor.id, Some(username.as_str()))
                .await?
        }
        SearchFilter::Nothing => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(FollowResource::serialize_many(&follows)))
}

/// Follow someone as the acting identity
pub async fn create_follow(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Bytes,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let actor = user.require()?;

    let payload = FollowResource::deserialize(parse_body(&body)?, WriteMode::Create)?;
    let edge = payload
        .resolve(actor, state.users.as_ref(), state.follows.as_ref())
        .await?;

    // A concurrent request may have inserted the same pair after the pre-check
    let follow = state
        .follows
        .insert(edge)
        .await?
        .ok_or_else(|| AppError::field(NON_FIELD_ERRORS, DUPLICATE_FOLLOW))?;
    info!(follow_id = follow.id, user_id = %follow.user_id, following_id = %follow.following_id, "follow created");

    Ok(HttpResponse::Created().json(FollowResource::serialize(&follow)))
}
