/// HTTP handlers for yatube endpoints
///
/// Every write handler runs its checks in the same order: collection
/// permission, lookups (parent post first), object permission, then payload
/// validation. Bodies are taken as raw bytes so that an anonymous or foreign
/// write is refused before its payload is even parsed.
pub mod comments;
pub mod follows;
pub mod groups;
pub mod health;
pub mod posts;

pub use comments::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use follows::{create_follow, list_follows};
pub use groups::{get_group, list_groups};
pub use health::{health_check, liveness_check};
pub use posts::{create_post, delete_post, get_post, list_posts, update_post};

use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::{AppError, Result};

/// Parse a JSON request body. An empty body is an empty object.
pub(crate) fn parse_body(body: &web::Bytes) -> Result<serde_json::Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Fallback for verbs a resource does not support.
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse> {
    Err(AppError::MethodNotAllowed(req.method().to_string()))
}

/// Fallback for unknown paths.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        let value = parse_body(&web::Bytes::from_static(b"  \n")).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        let err = parse_body(&web::Bytes::from_static(b"{\"text\":")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
