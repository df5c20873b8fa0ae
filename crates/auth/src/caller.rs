use serde::{Deserialize, Serialize};

use yatube_core::UserId;

use crate::JwtClaims;

/// Identity of an authenticated caller, as vouched for by the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

impl From<JwtClaims> for AuthenticatedUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

/// The identity associated with a request.
///
/// Passed explicitly into every handler; nothing reads it from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedUser),
}

impl Caller {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }
}

impl From<AuthenticatedUser> for Caller {
    fn from(user: AuthenticatedUser) -> Self {
        Caller::Authenticated(user)
    }
}
