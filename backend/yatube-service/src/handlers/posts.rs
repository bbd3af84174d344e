/// Post handlers - CRUD over all posts
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use super::parse_body;
use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{check_object_permission, check_permission};
use crate::middleware::CurrentUser;
use crate::models::Post;
use crate::pagination::{LimitOffsetQuery, Page};
use crate::serializers::{PostResource, Resource, WritableResource, WriteMode};

type Policy = <PostResource as Resource>::Permission;

pub(crate) async fn load_post(state: &AppState, id: i64) -> Result<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", id)))
}

/// List posts, windowed when `limit` is given
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<LimitOffsetQuery>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;

    let Some(window) = state.paginator.window(&query) else {
        let posts = state.posts.list(None, 0).await?;
        return Ok(HttpResponse::Ok().json(PostResource::serialize_many(&posts)));
    };

    let count = state.posts.count().await?;
    let posts = state.posts.list(Some(window.limit), window.offset).await?;
    let page = Page::new(&req, window, count, PostResource::serialize_many(&posts));

    Ok(HttpResponse::Ok().json(page))
}

/// Create a post authored by the acting identity
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Bytes,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let author = user.require()?;

    let payload = PostResource::deserialize(parse_body(&body)?, WriteMode::Create)?;
    payload.check_group(state.groups.as_ref()).await?;

    let post = state.posts.insert(payload.into_new_post(author.id)).await?;
    info!(post_id = post.id, author_id = %author.id, "post created");

    Ok(HttpResponse::Created().json(PostResource::serialize(&post)))
}

/// Get a post by ID
pub async fn get_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let post = load_post(&state, path.into_inner()).await?;
    check_object_permission::<Policy, _>(req.method(), user.user(), &post)?;

    Ok(HttpResponse::Ok().json(PostResource::serialize(&post)))
}

/// Replace (PUT) or partially update (PATCH) a post
pub async fn update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let method = req.method();
    check_permission::<Policy>(method, user.user())?;
    let post = load_post(&state, path.into_inner()).await?;
    check_object_permission::<Policy, _>(method, user.user(), &post)?;

    let payload = PostResource::deserialize(parse_body(&body)?, WriteMode::for_update(method))?;
    payload.check_group(state.groups.as_ref()).await?;

    let updated = state
        .posts
        .update(post.id, payload.into_changes())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", post.id)))?;
    info!(post_id = updated.id, %method, "post updated");

    Ok(HttpResponse::Ok().json(PostResource::serialize(&updated)))
}

/// Delete a post and its comments
pub async fn delete_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let post = load_post(&state, path.into_inner()).await?;
    check_object_permission::<Policy, _>(req.method(), user.user(), &post)?;

    if !state.posts.delete(post.id).await? {
        return Err(AppError::NotFound(format!("post {}", post.id)));
    }
    info!(post_id = post.id, "post deleted");

    Ok(HttpResponse::NoContent().finish())
}
