use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use yatube_blog::{BlogError, StoreError};
use yatube_core::{DomainError, FieldErrors};

/// Result type of every route handler; both arms are finished responses.
pub type ApiResult = Result<Response, Response>;

pub fn blog_error_to_response(err: BlogError) -> Response {
    match err {
        BlogError::Domain(e) => domain_error_to_response(e),
        BlogError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(fields) => validation_error(fields),
        // An id that cannot name any row is simply not found.
        DomainError::InvalidId(_) => json_error(StatusCode::NOT_FOUND, "not_found", "Not found."),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", "Not found."),
        DomainError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        DomainError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    tracing::error!(error = %err, "store failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "A server error occurred.",
    )
}

pub fn validation_error(fields: FieldErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": fields.to_string(),
            "fields": fields,
        })),
    )
        .into_response()
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (DomainError::validation("text", "This field is required."), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("abc"), StatusCode::NOT_FOUND),
            (DomainError::not_found("post"), StatusCode::NOT_FOUND),
            (DomainError::Unauthenticated("no".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (DomainError::bad_request("no"), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }

        let store = store_error_to_response(StoreError::Backend("boom".into()));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
