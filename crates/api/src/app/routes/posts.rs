use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use yatube_blog::handlers::posts;
use yatube_blog::payload::{Mode, PostPayload};
use yatube_core::PostId;

use crate::app::errors::{self, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::pagination::ListQuery;
use crate::app::routes::{common::parse_id, route_both};
use crate::app::{dto, services::AppServices};
use crate::context::RequestContext;

pub fn router() -> Router {
    let router = route_both(Router::new(), "/v1/posts", get(list_posts).post(create_post));
    route_both(
        router,
        "/v1/posts/:post_id",
        get(get_post)
            .put(update_post)
            .patch(partial_update_post)
            .delete(delete_post),
    )
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    query: ListQuery,
) -> ApiResult {
    let window = query.window(&services.pagination);
    let listing = posts::list(services.store(), window)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(query.respond(listing, window, dto::post_to_json))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<PostPayload>,
) -> ApiResult {
    let post = posts::create(services.store(), ctx.caller(), body)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::CREATED, Json(dto::post_to_json(post))).into_response())
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: PostId = parse_id(&id)?;
    let post = posts::retrieve(services.store(), id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::OK, Json(dto::post_to_json(post))).into_response())
}

pub async fn update_post(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<RequestContext>,
    id: Path<String>,
    body: JsonBody<PostPayload>,
) -> ApiResult {
    save(services, ctx, id, body, Mode::Full).await
}

pub async fn partial_update_post(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<RequestContext>,
    id: Path<String>,
    body: JsonBody<PostPayload>,
) -> ApiResult {
    save(services, ctx, id, body, Mode::Partial).await
}

async fn save(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PostPayload>,
    mode: Mode,
) -> ApiResult {
    let id: PostId = parse_id(&id)?;
    let post = posts::update(services.store(), ctx.caller(), id, body, mode)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::OK, Json(dto::post_to_json(post))).into_response())
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: PostId = parse_id(&id)?;
    posts::destroy(services.store(), ctx.caller(), id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
