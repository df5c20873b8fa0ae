use std::str::FromStr;

use axum::response::Response;

use yatube_core::DomainError;

use crate::app::errors;

/// Parse a path identifier; anything that is not a positive integer is a 404.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}
