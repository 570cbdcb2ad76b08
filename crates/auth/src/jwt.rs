//! HS256 token encoding/decoding on top of the deterministic claims model.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("token decoding failed: {0}")]
    Decode(jsonwebtoken::errors::Error),

    #[error(transparent)]
    InvalidClaims(#[from] TokenValidationError),
}

/// Transport-facing validator seam (the API middleware holds a `dyn` handle).
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HS256 symmetric-key issuer/validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(JwtError::Encode)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Time-window checks are done by `validate_claims` against our own
        // RFC3339 claim fields, not jsonwebtoken's numeric `exp`/`iat`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(JwtError::Decode)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleName;
    use chrono::Duration;
    use stocksmith_core::UserId;

    fn claims_for(minutes: i64) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            role: RoleName::new("admin"),
            issued_at: now,
            expires_at: now + Duration::minutes(minutes),
        }
    }

    #[test]
    fn issue_then_validate_round_trips_claims() {
        let jwt = Hs256Jwt::new("test-secret");
        let claims = claims_for(10);

        let token = jwt.issue(&claims).unwrap();
        let decoded = jwt.validate(&token, Utc::now()).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, claims.role);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = Hs256Jwt::new("secret-a");
        let validator = Hs256Jwt::new("secret-b");

        let token = issuer.issue(&claims_for(10)).unwrap();
        assert!(matches!(
            validator.validate(&token, Utc::now()),
            Err(JwtError::Decode(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = Hs256Jwt::new("test-secret");
        let token = jwt.issue(&claims_for(5)).unwrap();

        let later = Utc::now() + Duration::minutes(6);
        assert!(matches!(
            jwt.validate(&token, later),
            Err(JwtError::InvalidClaims(TokenValidationError::Expired))
        ));
    }
}
