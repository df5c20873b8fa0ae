//! Persistence port.
//!
//! Implementations own durability and the relational invariants: follow-edge
//! uniqueness, no self-follow, and cascading comment removal with their post.

use async_trait::async_trait;
use thiserror::Error;

use yatube_core::{CommentId, FollowId, GroupId, PostId, UserId};

use crate::model::{Comment, Follow, Group, NewComment, NewGroup, NewPost, Post, User};
use crate::pagination::{Listing, Window};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A check constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A referenced row does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Storage operations needed by the resource handlers.
///
/// All listings are ordered by id ascending; `window` slices after ordering
/// and `Listing::total` is the unwindowed count.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert or refresh a user mirrored from the identity provider.
    ///
    /// The token is authoritative: if another id still holds `user.username`,
    /// that row is renamed to [`released_username`] in the same write.
    async fn upsert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn list_posts(&self, window: Option<Window>) -> StoreResult<Listing<Post>>;
    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>>;
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;
    /// Persist `text` and `group` of an existing post.
    async fn update_post(&self, post: &Post) -> StoreResult<()>;
    /// Removes the post and its comments. Returns whether a row was deleted.
    async fn delete_post(&self, id: PostId) -> StoreResult<bool>;

    async fn list_comments(&self, post: PostId, window: Option<Window>) -> StoreResult<Listing<Comment>>;
    /// A comment, only if it belongs to `post`.
    async fn get_comment(&self, post: PostId, id: CommentId) -> StoreResult<Option<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    /// Persist `text` of an existing comment.
    async fn update_comment(&self, comment: &Comment) -> StoreResult<()>;
    async fn delete_comment(&self, id: CommentId) -> StoreResult<bool>;

    async fn list_groups(&self, window: Option<Window>) -> StoreResult<Listing<Group>>;
    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>>;
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group>;

    /// Edges whose follower is `user`, filtered so that every search term is a
    /// case-insensitive substring of the followed username.
    async fn list_follows(
        &self,
        user: UserId,
        search: &[String],
        window: Option<Window>,
    ) -> StoreResult<Listing<Follow>>;
    async fn follow_exists(&self, user: UserId, following: UserId) -> StoreResult<bool>;
    /// Fails with `Conflict` on a duplicate edge and `Constraint` on a self-follow.
    async fn insert_follow(&self, user: UserId, following: UserId) -> StoreResult<Follow>;
    /// An edge, only if its follower is `user`.
    async fn get_follow(&self, user: UserId, id: FollowId) -> StoreResult<Option<Follow>>;
    async fn delete_follow(&self, id: FollowId) -> StoreResult<bool>;
}

/// Placeholder name for a user whose username was reassigned to someone else.
///
/// `#` is outside the identity provider's username alphabet, so the
/// placeholder never collides with a real name. It is replaced the next time
/// that user authenticates.
pub fn released_username(id: UserId) -> String {
    format!("#{id}")
}

/// Whether `username` matches every search term (case-insensitive substring).
pub fn matches_search(username: &str, terms: &[String]) -> bool {
    let username = username.to_lowercase();
    terms.iter().all(|t| username.contains(&t.to_lowercase()))
}
