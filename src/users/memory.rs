use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{NewUser, User, UserRepository};
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct Store {
    next_id: i64,
    users: HashMap<i64, User>,
}

/// Process-local user store
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<Store>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut store = self.store.write().await;

        if store.users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )
            .into());
        }

        store.next_id += 1;
        let user = User {
            id: store.next_id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            is_active: true,
        };
        store.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        match store.users.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("alice@example.com")).await.unwrap();

        assert!(created.is_active);
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(
            repo.find_by_email("alice@example.com").await.unwrap(),
            Some(created)
        );
        assert_eq!(repo.find_by_email("bob@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("a@example.com")).await.unwrap();
        let b = repo.create(new_user("b@example.com")).await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("bob@example.com")).await.unwrap();

        let err = repo.create(new_user("bob@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Database(DatabaseError::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_set_active() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("carol@example.com")).await.unwrap();

        assert!(repo.set_active(user.id, false).await.unwrap());
        assert!(!repo.find_by_id(user.id).await.unwrap().unwrap().is_active);
        assert!(!repo.set_active(999, false).await.unwrap());
    }
}
