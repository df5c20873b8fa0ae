//! `BlogStore` implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBlogStore;
pub use postgres::PostgresBlogStore;
