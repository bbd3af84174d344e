/// Representations and payload parsing
///
/// Each resource declares its model, its JSON representation and the access
/// policy guarding it. Writable resources also declare a payload type: the
/// only fields a client may set. Server-owned fields (`author`, `post`, the
/// follow `user`) never appear in a payload and are injected by the handlers.
pub mod comment;
pub mod follow;
pub mod group;
pub mod post;

pub use comment::{CommentPayload, CommentRepresentation, CommentResource};
pub use follow::{FollowPayload, FollowRepresentation, FollowResource};
pub use group::{GroupRepresentation, GroupResource};
pub use post::{PostPayload, PostRepresentation, PostResource};

use actix_web::http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::{AppError, FieldErrors, Result, NON_FIELD_ERRORS};
use crate::middleware::Permission;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";

/// How a payload is applied to the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    /// PUT: required fields must be present
    Full,
    /// PATCH: every field is optional
    Partial,
}

impl WriteMode {
    /// Update mode for an object-level write.
    pub fn for_update(method: &Method) -> Self {
        if method == Method::PATCH {
            WriteMode::Partial
        } else {
            WriteMode::Full
        }
    }

    pub fn requires_all(self) -> bool {
        !matches!(self, WriteMode::Partial)
    }
}

pub trait Resource {
    type Model;
    type Representation: Serialize;
    type Permission: Permission;

    fn serialize(model: &Self::Model) -> Self::Representation;

    fn serialize_many(models: &[Self::Model]) -> Vec<Self::Representation> {
        models.iter().map(Self::serialize).collect()
    }
}

pub trait WritableResource: Resource {
    type Payload: DeserializeOwned + Validate;

    /// Fields for which an explicit `null` is an error rather than absence.
    const NOT_NULL: &'static [&'static str] = &[];

    /// Normalize the payload and record missing required fields.
    fn clean(payload: &mut Self::Payload, mode: WriteMode, errors: &mut FieldErrors);

    /// Parse a request body into a validated payload.
    fn deserialize(mut body: serde_json::Value, mode: WriteMode) -> Result<Self::Payload> {
        let Some(fields) = body.as_object_mut() else {
            return Err(AppError::field(
                NON_FIELD_ERRORS,
                "Invalid data. Expected a dictionary.",
            ));
        };

        let mut errors = FieldErrors::new();
        for field in Self::NOT_NULL {
            if fields.get(*field).is_some_and(serde_json::Value::is_null) {
                fields.remove(*field);
                errors.add(field, NULL);
            }
        }

        let mut payload: Self::Payload = serde_json::from_value(body)?;

        Self::clean(&mut payload, mode, &mut errors);
        if let Err(invalid) = payload.validate() {
            errors.merge(invalid.into());
        }
        errors.into_result()?;

        Ok(payload)
    }
}

/// Trim surrounding whitespace and flag a missing value when required. A
/// field already rejected (e.g. as `null`) is not reported again.
pub(crate) fn clean_text(
    field: &str,
    value: &mut Option<String>,
    mode: WriteMode,
    errors: &mut FieldErrors,
) {
    match value {
        Some(text) => *text = text.trim().to_string(),
        None if mode.requires_all() && errors.get(field).is_none() => {
            errors.add(field, REQUIRED)
        }
        None => {}
    }
}

/// Keeps an explicit `null` apart from an absent field: absent is `None`,
/// `null` is `Some(None)`. Use together with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
