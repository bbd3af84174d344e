use serde::Serialize;

use super::Resource;
use crate::middleware::AllowAny;
use crate::models::Group;

/// Groups are managed outside the API; there is no payload type.
pub struct GroupResource;

#[derive(Debug, Serialize)]
pub struct GroupRepresentation {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Resource for GroupResource {
    type Model = Group;
    type Representation = GroupRepresentation;
    type Permission = AllowAny;

    fn serialize(group: &Group) -> GroupRepresentation {
        GroupRepresentation {
            id: group.id,
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        }
    }
}
