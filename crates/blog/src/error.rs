use thiserror::Error;

use yatube_auth::AuthzError;
use yatube_core::DomainError;

use crate::store::StoreError;

pub type BlogResult<T> = Result<T, BlogError>;

/// Everything a resource handler can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthzError> for BlogError {
    fn from(err: AuthzError) -> Self {
        BlogError::Domain(err.into())
    }
}

impl From<yatube_core::FieldErrors> for BlogError {
    fn from(errors: yatube_core::FieldErrors) -> Self {
        BlogError::Domain(DomainError::Validation(errors))
    }
}
