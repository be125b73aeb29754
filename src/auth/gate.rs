/// Resolves a bearer access token to the user it was issued for.
///
/// Read-only: decoding plus one user lookup. A token that decodes fine is
/// still refused once its account is deactivated.

use std::sync::Arc;

use crate::auth::claims::TokenKind;
use crate::auth::jwt::TokenCodec;
use crate::error::{AppError, AuthError};
use crate::users::{User, UserRepository};

pub struct AuthGate {
    codec: TokenCodec,
    users: Arc<dyn UserRepository>,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, users: Arc<dyn UserRepository>) -> Self {
        Self { codec, users }
    }

    /// # Errors
    /// - `InvalidToken` for any decode failure, expiry included
    /// - `WrongTokenKind` for refresh tokens
    /// - `MissingSubject` when `sub` is absent
    /// - `UserNotFound` / `InactiveAccount` from the lookup
    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let claims = self.codec.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AuthError::InvalidToken
        })?;
        claims.expect_kind(TokenKind::Access)?;
        let user_id = claims.user_id()?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::InactiveAccount.into());
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::users::{InMemoryUserRepository, NewUser};

    const SECRET: &str = "gate-test-secret";

    struct Fixture {
        gate: AuthGate,
        codec: TokenCodec,
        users: Arc<InMemoryUserRepository>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let codec = TokenCodec::new(SECRET, clock.clone());
        let users = Arc::new(InMemoryUserRepository::new());
        let gate = AuthGate::new(codec.clone(), users.clone());

        Fixture {
            gate,
            codec,
            users,
            clock,
        }
    }

    async fn add_user(users: &InMemoryUserRepository, email: &str) -> User {
        users
            .create(NewUser {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                full_name: None,
            })
            .await
            .unwrap()
    }

    async fn kind_of(gate: &AuthGate, token: &str) -> AuthError {
        gate.resolve(token)
            .await
            .expect_err("expected rejection")
            .auth_kind()
            .expect("expected an AuthError kind")
    }

    #[tokio::test]
    async fn test_resolves_access_token() {
        let f = fixture();
        let user = add_user(&f.users, "alice@example.com").await;
        let token = f
            .codec
            .encode(&user.id.to_string(), TokenKind::Access, 30)
            .unwrap();

        let resolved = f.gate.resolve(&token).await.unwrap();
        assert_eq!(resolved.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_rejects_refresh_token() {
        let f = fixture();
        let user = add_user(&f.users, "alice@example.com").await;
        let token = f
            .codec
            .encode(&user.id.to_string(), TokenKind::Refresh, 30)
            .unwrap();

        assert_eq!(kind_of(&f.gate, &token).await, AuthError::WrongTokenKind);
    }

    #[tokio::test]
    async fn test_rejects_expired_token() {
        let f = fixture();
        let user = add_user(&f.users, "alice@example.com").await;
        let token = f
            .codec
            .encode(&user.id.to_string(), TokenKind::Access, 1)
            .unwrap();

        f.clock.advance(61);
        assert_eq!(kind_of(&f.gate, &token).await, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_rejects_foreign_signature() {
        let f = fixture();
        let user = add_user(&f.users, "alice@example.com").await;
        let foreign = TokenCodec::new("someone-elses-secret", f.clock.clone());
        let token = foreign
            .encode(&user.id.to_string(), TokenKind::Access, 30)
            .unwrap();

        assert_eq!(kind_of(&f.gate, &token).await, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let f = fixture();
        let token = f.codec.encode("999", TokenKind::Access, 30).unwrap();

        assert_eq!(kind_of(&f.gate, &token).await, AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn test_user_deactivated_after_issuance() {
        let f = fixture();
        let user = add_user(&f.users, "erin@example.com").await;
        let token = f
            .codec
            .encode(&user.id.to_string(), TokenKind::Access, 30)
            .unwrap();
        assert!(f.gate.resolve(&token).await.is_ok());

        f.users.set_active(user.id, false).await.unwrap();
        assert_eq!(kind_of(&f.gate, &token).await, AuthError::InactiveAccount);
    }

    #[tokio::test]
    async fn test_missing_subject() {
        let f = fixture();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({ "type": "access", "iat": f.codec.now(), "exp": f.codec.now() + 60 }),
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(kind_of(&f.gate, &token).await, AuthError::MissingSubject);
    }
}
