use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use yatube_blog::handlers::follows;
use yatube_blog::payload::FollowPayload;
use yatube_core::FollowId;

use crate::app::errors::{self, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::pagination::ListQuery;
use crate::app::routes::{common::parse_id, route_both};
use crate::app::{dto, services::AppServices};
use crate::context::RequestContext;

pub fn router() -> Router {
    let router = route_both(Router::new(), "/v1/follow", get(list_follows).post(create_follow));
    route_both(router, "/v1/follow/:id", get(get_follow).delete(delete_follow))
}

/// Edges of the caller only, optionally filtered by `?search=`.
pub async fn list_follows(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    query: ListQuery,
) -> ApiResult {
    let terms = follows::search_terms(query.search());
    let window = query.window(&services.pagination);
    let listing = follows::list(services.store(), ctx.caller(), &terms, window)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(query.respond(listing, window, dto::follow_to_json))
}

pub async fn create_follow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<FollowPayload>,
) -> ApiResult {
    let follow = follows::create(services.store(), ctx.caller(), body)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::CREATED, Json(dto::follow_to_json(follow))).into_response())
}

pub async fn get_follow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: FollowId = parse_id(&id)?;
    let follow = follows::retrieve(services.store(), ctx.caller(), id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::OK, Json(dto::follow_to_json(follow))).into_response())
}

pub async fn delete_follow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: FollowId = parse_id(&id)?;
    follows::destroy(services.store(), ctx.caller(), id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
