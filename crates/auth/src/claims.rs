use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use yatube_core::UserId;

/// Claims carried by tokens from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the identity provider's user id.
    pub sub: UserId,

    /// Username at issuance time (used to resolve follow edges and render authors).
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token carries an empty username")]
    MissingUsername,
}

/// Check the username and the `issued_at..expires_at` window against `now`.
///
/// Signatures are checked separately in [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.username.trim().is_empty() {
        return Err(TokenValidationError::MissingUsername);
    }
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(1),
            username: "leo".to_string(),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now + Duration::seconds(1)), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        let claims = claims_at(now);
        assert_eq!(
            validate_claims(&claims, now + Duration::minutes(5)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window_and_blank_username() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.expires_at = now;
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::InvalidTimeWindow));

        let mut claims = claims_at(now);
        claims.username = "  ".to_string();
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::MissingUsername));
    }
}
