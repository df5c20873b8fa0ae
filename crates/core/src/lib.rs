//! `yatube-core`: shared primitives for the blog API.
//!
//! Pure types only: identifiers, the error taxonomy and the entity trait.
//! No HTTP, no storage.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::{CommentId, FollowId, GroupId, PostId, UserId};
