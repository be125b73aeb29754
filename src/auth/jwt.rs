/// JWT Token Encoding and Decoding
///
/// HS256 tokens keyed by the configured secret. Expiry is checked against
/// the injected clock rather than by `jsonwebtoken`, so issuance and
/// validation always agree on what "now" is. There is no leeway.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::clock::Clock;
use crate::error::{AppError, AuthError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a token failed to decode
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed => AuthError::InvalidToken,
        }
    }
}

/// Signs and verifies tokens with one shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Mint a token for `subject` that lives for `ttl_minutes`
    ///
    /// # Errors
    /// Returns an internal error if signing fails
    pub fn encode(&self, subject: &str, kind: TokenKind, ttl_minutes: i64) -> Result<String, AppError> {
        let claims = Claims::new(subject, kind, self.clock.now(), ttl_minutes);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature and expiry, then return the claims
    ///
    /// The MAC is checked before the header or payload are parsed, so any
    /// edit to a well-formed token reports `InvalidSignature`.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let (message, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        if message.split('.').count() != 2 || signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        let signature_ok =
            jsonwebtoken::crypto::verify(signature, message.as_bytes(), &self.decoding_key, ALGORITHM)
                .map_err(|_| TokenError::Malformed)?;
        if !signature_ok {
            return Err(TokenError::InvalidSignature);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => {
                    tracing::debug!("JWT decode error: {}", e);
                    TokenError::Malformed
                }
            })?;

        if self.clock.now() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
