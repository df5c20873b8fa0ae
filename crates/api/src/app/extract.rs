use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::Response,
};
use serde::de::DeserializeOwned;

use yatube_auth::{Caller, CREDENTIALS_NOT_PROVIDED};

use crate::app::errors;
use crate::context::RequestContext;

/// JSON body whose rejections (bad syntax, wrong types, missing content type)
/// become 400 responses in the API's error shape.
///
/// Every route taking a body is a write that needs an identity, so an
/// anonymous caller with an unreadable body gets the 401 it would have got
/// with a valid one.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let anonymous = !req
            .extensions()
            .get::<RequestContext>()
            .map(RequestContext::caller)
            .is_some_and(Caller::is_authenticated);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(_) if anonymous => Err(errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                CREDENTIALS_NOT_PROVIDED,
            )),
            Err(rejection) => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                rejection.body_text(),
            )),
        }
    }
}
