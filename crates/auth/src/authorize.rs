//! Ownership-based authorization.
//!
//! - No IO
//! - No panics
//! - Pure policy checks, evaluated before any mutation is delegated to storage

use thiserror::Error;

use yatube_core::{DomainError, UserId};

use crate::{AuthenticatedUser, Caller};

pub const CREDENTIALS_NOT_PROVIDED: &str = "Authentication credentials were not provided.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Anonymous caller on an operation that needs an identity.
    #[error("{}", CREDENTIALS_NOT_PROVIDED)]
    Unauthenticated,

    /// Authenticated caller acting on something they do not own.
    #[error("{0}")]
    Forbidden(String),
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => DomainError::Unauthenticated(CREDENTIALS_NOT_PROVIDED.to_string()),
            AuthzError::Forbidden(msg) => DomainError::Forbidden(msg),
        }
    }
}

/// Resolve the caller's identity or fail with `Unauthenticated`.
pub fn require_authenticated(caller: &Caller) -> Result<&AuthenticatedUser, AuthzError> {
    caller.user().ok_or(AuthzError::Unauthenticated)
}

/// Require that `caller` is authenticated *and* is the author.
///
/// Anonymity is checked first, so an anonymous caller always gets
/// `Unauthenticated`, never `Forbidden`.
pub fn ensure_author<'c>(
    caller: &'c Caller,
    author: UserId,
    denial: &str,
) -> Result<&'c AuthenticatedUser, AuthzError> {
    let user = require_authenticated(caller)?;
    if user.id != author {
        tracing::debug!(caller = %user.id, %author, "ownership check denied");
        return Err(AuthzError::Forbidden(denial.to_string()));
    }
    Ok(user)
}
