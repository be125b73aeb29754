/// User storage
///
/// The auth core only ever sees `UserRepository`; Postgres backs it in
/// production and `InMemoryUserRepository` in tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

/// Fields needed to insert a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
}

/// What clients get to see of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Insert a user
    ///
    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` when the email is taken
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Activate or deactivate an account; returns false for unknown ids
    async fn set_active(&self, id: i64, is_active: bool) -> Result<bool, AppError>;
}
