use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use yatube_auth::{AuthenticatedUser, Caller, JwtValidator};
use yatube_blog::{BlogStore, User};

use crate::app::errors;
use crate::context::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub store: Arc<dyn BlogStore>,
}

/// Assign a request id, run the request inside an `http.request` span and echo
/// the id back in `x-request-id`.
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::now_v7);

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut res = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| tracing::debug!(status = res.status().as_u16(), "request finished"));

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Resolve the caller from the `Authorization` header.
///
/// No header means an anonymous caller; a header that is not a valid bearer
/// token is rejected with 401 on every route. Authenticated callers are
/// recorded in the store so their username can be resolved later.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let caller = match extract_bearer(req.headers()) {
        Ok(None) => Caller::Anonymous,
        Ok(Some(token)) => {
            let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "Given token not valid.")
            })?;

            let user = AuthenticatedUser::from(claims);
            state
                .store
                .upsert_user(&User::from(&user))
                .await
                .map_err(errors::store_error_to_response)?;
            Caller::Authenticated(user)
        }
        Err(message) => {
            return Err(errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message));
        }
    };

    req.extensions_mut().insert(RequestContext::new(caller));
    Ok(next.run(req).await)
}

/// `Ok(None)` when no credentials were sent at all.
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| "Invalid Authorization header.")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use the Bearer scheme.")?
        .trim();
    if token.is_empty() {
        return Err("Invalid Authorization header. No credentials provided.");
    }

    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def ")), Ok(Some("abc.def")));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_errors() {
        assert!(extract_bearer(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&headers("Bearer   ")).is_err());
    }
}
