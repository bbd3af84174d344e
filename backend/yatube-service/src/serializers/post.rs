use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{clean_text, nullable, Resource, WritableResource, WriteMode};
use crate::db::GroupRepository;
use crate::error::{AppError, FieldErrors, Result};
use crate::middleware::IsAuthorOrReadOnly;
use crate::models::{NewPost, Post, PostChanges};

pub struct PostResource;

#[derive(Debug, Serialize)]
pub struct PostRepresentation {
    pub id: i64,
    pub text: String,
    /// Author username
    pub author: String,
    pub image: Option<String>,
    pub group: Option<i64>,
    pub pub_date: DateTime<Utc>,
}

/// Client-writable post fields. `author`, `id` and `pub_date` are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PostPayload {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub group: Option<Option<i64>>,
}

impl Resource for PostResource {
    type Model = Post;
    type Representation = PostRepresentation;
    type Permission = IsAuthorOrReadOnly;

    fn serialize(post: &Post) -> PostRepresentation {
        PostRepresentation {
            id: post.id,
            text: post.text.clone(),
            author: post.author.clone(),
            image: post.image.clone(),
            group: post.group_id,
            pub_date: post.pub_date,
        }
    }
}

impl WritableResource for PostResource {
    type Payload = PostPayload;
    const NOT_NULL: &'static [&'static str] = &["text"];

    fn clean(payload: &mut PostPayload, mode: WriteMode, errors: &mut FieldErrors) {
        clean_text("text", &mut payload.text, mode, errors);
        if let Some(Some(image)) = payload.image.as_mut() {
            *image = image.trim().to_string();
        }
        // An empty image reference means no image
        if matches!(&payload.image, Some(Some(image)) if image.is_empty()) {
            payload.image = Some(None);
        }
    }
}

impl PostPayload {
    /// Group referenced by the payload must exist.
    pub async fn check_group(&self, groups: &dyn GroupRepository) -> Result<()> {
        if let Some(Some(group_id)) = self.group {
            if groups.find_by_id(group_id).await?.is_none() {
                return Err(AppError::field(
                    "group",
                    format!("Invalid pk \"{}\" - object does not exist.", group_id),
                ));
            }
        }
        Ok(())
    }

    pub fn into_new_post(self, author_id: Uuid) -> NewPost {
        NewPost {
            text: self.text.unwrap_or_default(),
            author_id,
            image: self.image.flatten(),
            group_id: self.group.flatten(),
        }
    }

    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            text: self.text,
            image: self.image,
            group_id: self.group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewGroup;
    use crate::serializers::BLANK;
    use serde_json::json;

    #[test]
    fn create_requires_text() {
        let err = PostResource::deserialize(json!({"group": null}), WriteMode::Create).unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.get("text"), Some(&["This field is required.".to_string()][..]))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_text_is_rejected_after_trimming() {
        let err = PostResource::deserialize(json!({"text": "   "}), WriteMode::Partial).unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.get("text"), Some(&[BLANK.to_string()][..]))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_owned_fields_are_ignored() {
        let payload = PostResource::deserialize(
            json!({"text": "hi", "author": "mallory", "id": 99, "pub_date": "2001-01-01"}),
            WriteMode::Create,
        )
        .unwrap();
        let author = Uuid::new_v4();
        let post = payload.into_new_post(author);

        assert_eq!(post.author_id, author);
        assert_eq!(post.text, "hi");
    }

    #[test]
    fn partial_payload_only_touches_given_fields() {
        let changes = PostResource::deserialize(json!({"group": null}), WriteMode::Partial)
            .unwrap()
            .into_changes();

        assert_eq!(changes.text, None);
        assert_eq!(changes.image, None);
        assert_eq!(changes.group_id, Some(None));
    }

    #[test]
    fn wrongly_typed_field_is_a_validation_error() {
        let err = PostResource::deserialize(json!({"text": "a", "group": "cats"}), WriteMode::Create)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_group_is_rejected() {
        let store = MemoryStore::new();
        let group = GroupRepository::insert(
            &store,
            NewGroup {
                title: "Cats".into(),
                slug: "cats".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap();

        let known = PostPayload {
            text: Some("x".into()),
            group: Some(Some(group.id)),
            ..Default::default()
        };
        assert!(known.check_group(&store).await.is_ok());

        let unknown = PostPayload {
            text: Some("x".into()),
            group: Some(Some(group.id + 100)),
            ..Default::default()
        };
        match unknown.check_group(&store).await.unwrap_err() {
            AppError::Validation(fields) => assert_eq!(
                fields.get("group").unwrap()[0],
                format!("Invalid pk \"{}\" - object does not exist.", group.id + 100)
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
