use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skyportal_core::UserId;

use crate::Role;

/// Bearer-token claims (transport-agnostic).
///
/// This is the minimal claim set skyportal expects once a token has been
/// decoded and its signature verified by whatever codec is in use. Timestamps
/// are unix seconds, the wire encoding JWTs use natively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Email the identity was registered under.
    pub email: String,

    /// Roles granted to the subject.
    pub roles: Vec<Role>,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiration, unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn new(
        sub: UserId,
        email: impl Into<String>,
        roles: Vec<Role>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub,
            email: email.into(),
            roles,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is the codec's job (see [`crate::token`]).
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(issued_at: DateTime<Utc>, ttl: Duration) -> Claims {
        Claims::new(
            UserId::new(),
            "alice@example.com",
            vec![Role::new("user")],
            issued_at,
            ttl,
        )
    }

    #[test]
    fn valid_window_passes() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(10));
        assert_eq!(validate_claims(&claims, now), Ok(()));
    }

    #[test]
    fn expired_token_rejected() {
        let now = Utc::now();
        let claims = claims_at(now - Duration::hours(2), Duration::minutes(10));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_issued_token_rejected() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(5), Duration::minutes(10));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now, Duration::minutes(10));
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
