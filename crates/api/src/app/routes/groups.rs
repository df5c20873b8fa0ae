use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use yatube_blog::handlers::groups;
use yatube_core::GroupId;

use crate::app::errors::{self, ApiResult};
use crate::app::pagination::ListQuery;
use crate::app::routes::{common::parse_id, route_both};
use crate::app::{dto, services::AppServices};

/// Read-only; groups are created outside the API.
pub fn router() -> Router {
    let router = route_both(Router::new(), "/v1/groups", get(list_groups));
    route_both(router, "/v1/groups/:id", get(get_group))
}

pub async fn list_groups(
    Extension(services): Extension<Arc<AppServices>>,
    query: ListQuery,
) -> ApiResult {
    let window = query.window(&services.pagination);
    let listing = groups::list(services.store(), window)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(query.respond(listing, window, dto::group_to_json))
}

pub async fn get_group(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: GroupId = parse_id(&id)?;
    let group = groups::retrieve(services.store(), id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::OK, Json(dto::group_to_json(group))).into_response())
}
