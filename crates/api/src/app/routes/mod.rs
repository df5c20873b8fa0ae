use axum::{Router, routing::MethodRouter};

pub mod comments;
pub mod common;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod system;

/// Router for every `/v1` resource (runs behind the auth middleware).
pub fn router() -> Router {
    Router::new()
        .merge(posts::router())
        .merge(comments::router())
        .merge(groups::router())
        .merge(follows::router())
}

/// Register `path` both with and without a trailing slash.
pub(crate) fn route_both(router: Router, path: &str, methods: MethodRouter) -> Router {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}
