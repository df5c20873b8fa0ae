use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use yatube_blog::handlers::comments;
use yatube_blog::payload::{CommentPayload, Mode};
use yatube_core::{CommentId, PostId};

use crate::app::errors::{self, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::pagination::ListQuery;
use crate::app::routes::{common::parse_id, route_both};
use crate::app::{dto, services::AppServices};
use crate::context::RequestContext;

pub fn router() -> Router {
    let router = route_both(
        Router::new(),
        "/v1/posts/:post_id/comments",
        get(list_comments).post(create_comment),
    );
    route_both(
        router,
        "/v1/posts/:post_id/comments/:id",
        get(get_comment)
            .put(update_comment)
            .patch(partial_update_comment)
            .delete(delete_comment),
    )
}

fn parse_ids(post_id: &str, id: &str) -> Result<(PostId, CommentId), Response> {
    Ok((parse_id(post_id)?, parse_id(id)?))
}

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(post_id): Path<String>,
    query: ListQuery,
) -> ApiResult {
    let post_id: PostId = parse_id(&post_id)?;
    let window = query.window(&services.pagination);
    let listing = comments::list(services.store(), post_id, window)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(query.respond(listing, window, dto::comment_to_json))
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(post_id): Path<String>,
    JsonBody(body): JsonBody<CommentPayload>,
) -> ApiResult {
    let post_id: PostId = parse_id(&post_id)?;
    let comment = comments::create(services.store(), ctx.caller(), post_id, body)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::CREATED, Json(dto::comment_to_json(comment))).into_response())
}

pub async fn get_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Path((post_id, id)): Path<(String, String)>,
) -> ApiResult {
    let (post_id, id) = parse_ids(&post_id, &id)?;
    let comment = comments::retrieve(services.store(), post_id, id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::OK, Json(dto::comment_to_json(comment))).into_response())
}

pub async fn update_comment(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<RequestContext>,
    ids: Path<(String, String)>,
    body: JsonBody<CommentPayload>,
) -> ApiResult {
    save(services, ctx, ids, body, Mode::Full).await
}

pub async fn partial_update_comment(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<RequestContext>,
    ids: Path<(String, String)>,
    body: JsonBody<CommentPayload>,
) -> ApiResult {
    save(services, ctx, ids, body, Mode::Partial).await
}

async fn save(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path((post_id, id)): Path<(String, String)>,
    JsonBody(body): JsonBody<CommentPayload>,
    mode: Mode,
) -> ApiResult {
    let (post_id, id) = parse_ids(&post_id, &id)?;
    let comment = comments::update(services.store(), ctx.caller(), post_id, id, body, mode)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok((StatusCode::OK, Json(dto::comment_to_json(comment))).into_response())
}

pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path((post_id, id)): Path<(String, String)>,
) -> ApiResult {
    let (post_id, id) = parse_ids(&post_id, &id)?;
    comments::destroy(services.store(), ctx.caller(), post_id, id)
        .await
        .map_err(errors::blog_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
