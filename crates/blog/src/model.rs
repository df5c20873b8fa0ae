//! Persisted entities as the handlers see them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use yatube_core::{CommentId, Entity, FollowId, GroupId, PostId, UserId};

/// A user known to the store (mirrored from the identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

impl From<&yatube_auth::AuthenticatedUser> for User {
    fn from(user: &yatube_auth::AuthenticatedUser) -> Self {
        Self::new(user.id, user.username.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub author: User,
    pub group: Option<GroupId>,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: User,
    pub post: PostId,
    pub created: DateTime<Utc>,
}

/// Read-only through the API; managed administratively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Directed edge `user` -> `following`.
///
/// # Invariants
/// - `user != following`
/// - at most one edge per `(user, following)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: FollowId,
    pub user: User,
    pub following: User,
}

// Insert shapes: everything except the store-assigned id.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    pub author: UserId,
    pub group: Option<GroupId>,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
    pub author: UserId,
    pub post: PostId,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

macro_rules! impl_entity {
    ($t:ty, $id:ty, $resource:literal) => {
        impl Entity for $t {
            const RESOURCE: &'static str = $resource;
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }
        }
    };
}

impl_entity!(User, UserId, "user");
impl_entity!(Post, PostId, "post");
impl_entity!(Comment, CommentId, "comment");
impl_entity!(Group, GroupId, "group");
impl_entity!(Follow, FollowId, "follow");
