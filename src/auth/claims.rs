/// JWT Claims structure
///
/// Payload carried by both access and refresh tokens. The `type` claim
/// keeps the two purposes apart; nothing else distinguishes them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AuthError;

/// Purpose tag of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::str::FromStr for TokenKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            _ => Err(AuthError::WrongTokenKind),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded token payload
///
/// Decoding is lenient about `sub` and `type` so that tokens minted by other
/// issuers sharing the key still reach the kind and subject checks instead
/// of failing as malformed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user id; minted as a decimal string, integers accepted)
    #[serde(
        default,
        deserialize_with = "string_or_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,
    /// Raw `type` claim, see [`Claims::kind`]
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Unique token id
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    pub fn new(subject: &str, kind: TokenKind, issued_at: i64, ttl_minutes: i64) -> Self {
        Self {
            sub: Some(subject.to_string()),
            token_type: Some(kind.as_str().to_string()),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_minutes.saturating_mul(60)),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Purpose of the token; `None` when `type` is absent or unrecognised
    pub fn kind(&self) -> Option<TokenKind> {
        self.token_type.as_deref()?.parse().ok()
    }

    /// Reject tokens minted for another purpose
    pub fn expect_kind(&self, kind: TokenKind) -> Result<(), AuthError> {
        if self.kind() == Some(kind) {
            Ok(())
        } else {
            Err(AuthError::WrongTokenKind)
        }
    }

    /// Extract the numeric user id from `sub`
    ///
    /// # Errors
    /// `MissingSubject` when the claim is absent, `InvalidToken` when it is
    /// not a user id.
    pub fn user_id(&self) -> Result<i64, AuthError> {
        let sub = self.sub.as_deref().ok_or(AuthError::MissingSubject)?;
        sub.parse::<i64>().map_err(|_| AuthError::InvalidToken)
    }
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Text(String),
        Integer(i64),
    }

    Ok(Option::<Subject>::deserialize(deserializer)?.map(|subject| match subject {
        Subject::Text(text) => text,
        Subject::Integer(id) => id.to_string(),
    }))
}

/// Access/refresh pair handed to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}
