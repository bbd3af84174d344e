use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Resource, WritableResource, WriteMode, REQUIRED};
use crate::db::{FollowRepository, UserRepository};
use crate::error::{AppError, FieldErrors, Result, NON_FIELD_ERRORS};
use crate::middleware::IsAuthenticated;
use crate::models::{Follow, NewFollow, User};

pub const SELF_FOLLOW: &str = "cannot follow yourself";
pub const DUPLICATE_FOLLOW: &str = "The fields user, following must make a unique set.";

pub struct FollowResource;

#[derive(Debug, Serialize)]
pub struct FollowRepresentation {
    pub id: i64,
    /// Follower username
    pub user: String,
    /// Followed username
    pub following: String,
}

/// Usernames as sent by the client. `user` is checked but always replaced by
/// the acting identity.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FollowPayload {
    pub user: Option<String>,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub following: Option<String>,
}

impl Resource for FollowResource {
    type Model = Follow;
    type Representation = FollowRepresentation;
    type Permission = IsAuthenticated;

    fn serialize(follow: &Follow) -> FollowRepresentation {
        FollowRepresentation {
            id: follow.id,
            user: follow.username.clone(),
            following: follow.following_username.clone(),
        }
    }
}

impl WritableResource for FollowResource {
    type Payload = FollowPayload;
    const NOT_NULL: &'static [&'static str] = &["following"];

    fn clean(payload: &mut FollowPayload, mode: WriteMode, errors: &mut FieldErrors) {
        if let Some(following) = payload.following.as_mut() {
            *following = following.trim().to_string();
        } else if mode.requires_all() && errors.get("following").is_none() {
            errors.add("following", REQUIRED);
        }
        if let Some(user) = payload.user.as_mut() {
            *user = user.trim().to_string();
        }
    }
}

fn does_not_exist(username: &str) -> String {
    format!("Object with username={} does not exist.", username)
}

impl FollowPayload {
    /// Resolve usernames and apply the edge rules for `actor` following
    /// someone: the target exists, is not the actor, and is not followed yet.
    pub async fn resolve(
        self,
        actor: &User,
        users: &dyn UserRepository,
        follows: &dyn FollowRepository,
    ) -> Result<NewFollow> {
        let mut errors = FieldErrors::new();

        if let Some(username) = self.user.as_deref() {
            if users.find_by_username(username).await?.is_none() {
                errors.add("user", does_not_exist(username));
            }
        }

        let following = match self.following.as_deref() {
            Some(username) => {
                let found = users.find_by_username(username).await?;
                if found.is_none() {
                    errors.add("following", does_not_exist(username));
                }
                found
            }
            None => {
                errors.add("following", REQUIRED);
                None
            }
        };

        errors.into_result()?;
        let following = following.ok_or_else(|| AppError::field("following", REQUIRED))?;

        if following.id == actor.id {
            return Err(AppError::field("following", SELF_FOLLOW));
        }

        if follows.exists(actor.id, following.id).await? {
            return Err(AppError::field(NON_FIELD_ERRORS, DUPLICATE_FOLLOW));
        }

        Ok(NewFollow {
            user_id: actor.id,
            following_id: following.id,
        })
    }
}
