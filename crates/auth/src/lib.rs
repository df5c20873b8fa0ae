//! `yatube-auth`: authentication/authorization boundary.
//!
//! Tokens are issued by an external identity provider; this crate only
//! validates them and turns them into an explicit [`Caller`]. Nothing here
//! depends on HTTP or storage.

pub mod authorize;
pub mod caller;
pub mod claims;
pub mod jwt;

pub use authorize::{AuthzError, CREDENTIALS_NOT_PROVIDED, ensure_author, require_authenticated};
pub use caller::{AuthenticatedUser, Caller};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
