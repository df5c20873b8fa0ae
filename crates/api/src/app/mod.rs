//! HTTP application wiring (Axum router + store wiring).
//!
//! Layout:
//! - `services.rs`: shared state handed to every route (store, pagination policy)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: JSON mapping of domain types
//! - `pagination.rs`: list query parsing and the paginated envelope
//! - `extract.rs`: body extraction with the API's error shape
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;

use yatube_blog::BlogStore;
use yatube_infra::{InMemoryBlogStore, PostgresBlogStore};

use crate::config::StoreConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod pagination;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(jwt_secret: String, store: Arc<dyn BlogStore>) -> Router {
    let jwt = Arc::new(yatube_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState {
        jwt,
        store: store.clone(),
    };
    let services = Arc::new(services::AppServices::new(store));

    let api = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(routes::system::router())
        .merge(api)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_id_middleware)))
}

/// Construct the configured store; the Postgres schema is applied on startup.
pub async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn BlogStore>> {
    match config {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(InMemoryBlogStore::new()))
        }
        StoreConfig::Postgres { url, max_connections } => {
            let store = PostgresBlogStore::connect(url, *max_connections)
                .await
                .context("failed to connect to postgres")?;
            store.migrate().await.context("failed to apply schema")?;
            tracing::info!(max_connections, "using postgres store");
            Ok(Arc::new(store))
        }
    }
}
