/// Authorization module for yatube-service
///
/// Collection-level checks run before any lookup; object-level checks run once
/// the target has been loaded. Both are pure decisions over the request method,
/// the acting identity and (for object checks) the target's author.
use actix_web::http::Method;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::User;

/// Content that has an author.
pub trait Owned {
    fn author_id(&self) -> Uuid;
}

/// GET, HEAD and OPTIONS never modify state.
pub fn is_safe_method(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD || method == Method::OPTIONS
}

/// Access policy attached to a resource.
pub trait Permission {
    fn has_permission(method: &Method, user: Option<&User>) -> bool;

    fn has_object_permission<T: Owned>(_method: &Method, _user: Option<&User>, _obj: &T) -> bool {
        true
    }
}

/// Anyone may read; authenticated identities may create; only the author may
/// change or remove.
pub struct IsAuthorOrReadOnly;

impl Permission for IsAuthorOrReadOnly {
    fn has_permission(method: &Method, user: Option<&User>) -> bool {
        is_safe_method(method) || user.is_some()
    }

    fn has_object_permission<T: Owned>(method: &Method, user: Option<&User>, obj: &T) -> bool {
        is_safe_method(method) || user.map_or(false, |u| u.id == obj.author_id())
    }
}

pub struct AllowAny;

impl Permission for AllowAny {
    fn has_permission(_method: &Method, _user: Option<&User>) -> bool {
        true
    }
}

/// Every method, reads included, needs an identity.
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(_method: &Method, user: Option<&User>) -> bool {
        user.is_some()
    }
}

/// Anonymous callers get 401, authenticated ones 403.
fn denied(user: Option<&User>) -> AppError {
    match user {
        None => AppError::AuthenticationRequired,
        Some(_) => AppError::PermissionDenied,
    }
}

pub fn check_permission<P: Permission>(method: &Method, user: Option<&User>) -> Result<()> {
    if P::has_permission(method, user) {
        Ok(())
    } else {
        tracing::debug!(%method, authenticated = user.is_some(), "request denied");
        Err(denied(user))
    }
}

pub fn check_object_permission<P: Permission, T: Owned>(
    method: &Method,
    user: Option<&User>,
    obj: &T,
) -> Result<()> {
    if P::has_object_permission(method, user, obj) {
        Ok(())
    } else {
        tracing::warn!(
            %method,
            user_id = ?user.map(|u| u.id),
            author_id = %obj.author_id(),
            "write on foreign object denied"
        );
        Err(denied(user))
    }
}
