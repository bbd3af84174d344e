use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{clean_text, Resource, WritableResource, WriteMode};
use crate::error::FieldErrors;
use crate::middleware::IsAuthorOrReadOnly;
use crate::models::{Comment, NewComment};

pub struct CommentResource;

#[derive(Debug, Serialize)]
pub struct CommentRepresentation {
    pub id: i64,
    /// Author username
    pub author: String,
    pub post: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// Only `text` is writable; `author` and `post` come from the request context.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub text: Option<String>,
}

impl Resource for CommentResource {
    type Model = Comment;
    type Representation = CommentRepresentation;
    type Permission = IsAuthorOrReadOnly;

    fn serialize(comment: &Comment) -> CommentRepresentation {
        CommentRepresentation {
            id: comment.id,
            author: comment.author.clone(),
            post: comment.post_id,
            text: comment.text.clone(),
            created: comment.created,
        }
    }
}

impl WritableResource for CommentResource {
    type Payload = CommentPayload;
    const NOT_NULL: &'static [&'static str] = &["text"];

    fn clean(payload: &mut CommentPayload, mode: WriteMode, errors: &mut FieldErrors) {
        clean_text("text", &mut payload.text, mode, errors);
    }
}

impl CommentPayload {
    pub fn into_new_comment(self, post_id: i64, author_id: Uuid) -> NewComment {
        NewComment {
            post_id,
            author_id,
            text: self.text.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn post_and_author_in_payload_are_ignored() {
        let payload = CommentResource::deserialize(
            json!({"text": " nice ", "post": 42, "author": "mallory"}),
            WriteMode::Create,
        )
        .unwrap();
        let author = Uuid::new_v4();
        let comment = payload.into_new_comment(7, author);

        assert_eq!(comment.post_id, 7);
        assert_eq!(comment.author_id, author);
        assert_eq!(comment.text, "nice");
    }

    #[test]
    fn put_requires_text_but_patch_does_not() {
        assert!(matches!(
            CommentResource::deserialize(json!({}), WriteMode::Full),
            Err(AppError::Validation(_))
        ));
        let payload = CommentResource::deserialize(json!({}), WriteMode::Partial).unwrap();
        assert!(payload.text.is_none());
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(
            CommentResource::deserialize(json!(["text"]), WriteMode::Create),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn patch_with_null_text_is_rejected() {
        match CommentResource::deserialize(json!({"text": null}), WriteMode::Partial) {
            Err(AppError::Validation(fields)) => assert_eq!(
                fields.get("text"),
                Some(&["This field may not be null.".to_string()][..])
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
