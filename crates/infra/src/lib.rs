//! Infrastructure layer: storage adapters for the blog.

pub mod store;

#[cfg(test)]
mod integration_tests;

pub use store::{InMemoryBlogStore, PostgresBlogStore};
