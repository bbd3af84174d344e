/// Comment handlers - CRUD over the comments of one post
///
/// The parent post is resolved from the path before anything else; a comment
/// id that belongs to another post is treated as missing.
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use super::parse_body;
use super::posts::load_post;
use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{check_object_permission, check_permission};
use crate::middleware::CurrentUser;
use crate::models::Comment;
use crate::serializers::{CommentResource, Resource, WritableResource, WriteMode};

type Policy = <CommentResource as Resource>::Permission;

async fn load_comment(state: &AppState, post_id: i64, id: i64) -> Result<Comment> {
    load_post(state, post_id).await?;
    state
        .comments
        .find_in_post(post_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {} of post {}", id, post_id)))
}

pub async fn list_comments(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let post = load_post(&state, path.into_inner()).await?;

    let comments = state.comments.list_by_post(post.id).await?;
    Ok(HttpResponse::Ok().json(CommentResource::serialize_many(&comments)))
}

/// Create a comment; `post` comes from the path, `author` from the identity
pub async fn create_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let author = user.require()?;
    let post = load_post(&state, path.into_inner()).await?;

    let payload = CommentResource::deserialize(parse_body(&body)?, WriteMode::Create)?;
    let comment = state
        .comments
        .insert(payload.into_new_comment(post.id, author.id))
        .await?;
    info!(comment_id = comment.id, post_id = post.id, author_id = %author.id, "comment created");

    Ok(HttpResponse::Created().json(CommentResource::serialize(&comment)))
}

pub async fn get_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let (post_id, id) = path.into_inner();
    let comment = load_comment(&state, post_id, id).await?;
    check_object_permission::<Policy, _>(req.method(), user.user(), &comment)?;

    Ok(HttpResponse::Ok().json(CommentResource::serialize(&comment)))
}

/// PUT or PATCH a comment's text
pub async fn update_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(i64, i64)>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let method = req.method();
    check_permission::<Policy>(method, user.user())?;
    let (post_id, id) = path.into_inner();
    let comment = load_comment(&state, post_id, id).await?;
    check_object_permission::<Policy, _>(method, user.user(), &comment)?;

    let payload = CommentResource::deserialize(parse_body(&body)?, WriteMode::for_update(method))?;
    let updated = match payload.text {
        Some(text) => state
            .comments
            .update_text(comment.id, &text)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment.id)))?,
        None => comment,
    };
    info!(comment_id = updated.id, %method, "comment updated");

    Ok(HttpResponse::Ok().json(CommentResource::serialize(&updated)))
}

pub async fn delete_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let (post_id, id) = path.into_inner();
    let comment = load_comment(&state, post_id, id).await?;
    check_object_permission::<Policy, _>(req.method(), user.user(), &comment)?;

    if !state.comments.delete(comment.id).await? {
        return Err(AppError::NotFound(format!("comment {}", comment.id)));
    }
    info!(comment_id = comment.id, post_id, "comment deleted");

    Ok(HttpResponse::NoContent().finish())
}
