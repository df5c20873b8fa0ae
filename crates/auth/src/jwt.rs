//! Signature verification for bearer tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HS256 shared-secret validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked by `validate_claims` against our own claim names.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| JwtError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use yatube_core::UserId;

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(11),
            username: "regular_user".to_string(),
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn round_trips_a_signed_token() {
        let now = Utc::now();
        let token = mint("s3cret", &claims(now));
        let validator = Hs256JwtValidator::new("s3cret");
        let decoded = validator.validate(&token, now).unwrap();
        assert_eq!(decoded.sub, UserId::new(11));
        assert_eq!(decoded.username, "regular_user");
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = mint("s3cret", &claims(now));
        let validator = Hs256JwtValidator::new("other");
        assert!(matches!(validator.validate(&token, now), Err(JwtError::Decode(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let token = mint("s3cret", &claims(now));
        let validator = Hs256JwtValidator::new("s3cret");
        assert_eq!(
            validator.validate(&token, now + Duration::hours(1)),
            Err(JwtError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn rejects_garbage() {
        let validator = Hs256JwtValidator::new("s3cret");
        assert!(validator.validate("not.a.jwt", Utc::now()).is_err());
    }
}
