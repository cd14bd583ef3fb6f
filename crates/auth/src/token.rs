//! Bearer credential codec.
//!
//! [`TokenDecoder`] is the seam the HTTP layer consumes: raw credential in,
//! verified [`Claims`] out. [`Hs256TokenCodec`] is the production
//! implementation (shared-secret HS256 JWTs via `jsonwebtoken`); login and
//! registration use its [`Hs256TokenCodec::issue`] counterpart.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, Claims, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Structural or signature rejection. Deliberately coarse: callers only
    /// learn that the credential did not verify, not why.
    #[error("malformed or unverifiable token")]
    Invalid,

    #[error("failed to encode token")]
    Encode,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Resolves a raw bearer credential into verified claims.
///
/// Implementations verify integrity (signature, structure); the claim time
/// window is checked with the shared [`validate_claims`] against the caller's
/// clock, so decoding stays deterministic and testable.
pub trait TokenDecoder: Send + Sync {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}

/// HS256 codec over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is validated in `validate_claims` with an injected clock,
        // not by the library against wall time.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| TokenError::Encode)
    }
}

impl TokenDecoder for Hs256TokenCodec {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
