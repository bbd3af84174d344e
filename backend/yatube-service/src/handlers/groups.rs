/// Group handlers - read-only
use actix_web::{web, HttpRequest, HttpResponse};

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::middleware::permissions::check_permission;
use crate::middleware::CurrentUser;
use crate::serializers::{GroupResource, Resource};

type Policy = <GroupResource as Resource>::Permission;

pub async fn list_groups(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let groups = state.groups.list().await?;
    Ok(HttpResponse::Ok().json(GroupResource::serialize_many(&groups)))
}

pub async fn get_group(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    check_permission::<Policy>(req.method(), user.user())?;
    let id = path.into_inner();
    let group = state
        .groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group {}", id)))?;
    Ok(HttpResponse::Ok().json(GroupResource::serialize(&group)))
}
