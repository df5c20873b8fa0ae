//! `yatube-blog`: posts, comments, groups and follow edges.
//!
//! The resource handlers here carry all authorization and validation rules;
//! persistence is reached only through the [`BlogStore`] port, and HTTP only
//! through the API crate.

pub mod error;
pub mod handlers;
pub mod model;
pub mod pagination;
pub mod payload;
pub mod store;

pub use error::{BlogError, BlogResult};
pub use model::{Comment, Follow, Group, Post, User};
pub use pagination::{Listing, PaginationPolicy, Previous, Window};
pub use store::{BlogStore, StoreError, StoreResult};
