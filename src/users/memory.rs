use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo::{CredentialStore, StoreError};
use crate::users::repo_types::{NewUserRecord, User};

/// In-process credential store with the same uniqueness contract as the
/// Postgres backend. Backs the test suite.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn remove(&self, id: Uuid) -> Option<User> {
        self.users.write().await.remove(&id)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, record: NewUserRecord) -> Result<User, StoreError> {
        // Check and insert under one write guard.
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == record.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            photo: record.photo,
            phone: record.phone,
            bio: record.bio,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.id).ok_or(StoreError::NotFound)?;
        stored.name = user.name.clone();
        stored.photo = user.photo.clone();
        stored.phone = user.phone.clone();
        stored.bio = user.bio.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record(email: &str) -> NewUserRecord {
        NewUserRecord::with_defaults("Ada".into(), email.into(), "$argon2id$fake".into())
    }

    #[tokio::test]
    async fn create_then_find_by_email_and_id() {
        let store = MemoryCredentialStore::new();
        let user = store.create(record("ada@example.com")).await.unwrap();

        let by_email = store.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
        assert_eq!(by_id.photo, crate::users::repo_types::DEFAULT_PHOTO);
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryCredentialStore::new();
        store.create(record("ada@example.com")).await.unwrap();
        let err = store.create(record("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_yield_one_winner() {
        let store = Arc::new(MemoryCredentialStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(record("race@example.com")).await })
            })
            .collect();

        let mut ok = 0;
        let mut dup = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(StoreError::DuplicateEmail) => dup += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 7);
    }

    #[tokio::test]
    async fn save_updates_fields_and_timestamp() {
        let store = MemoryCredentialStore::new();
        let mut user = store.create(record("ada@example.com")).await.unwrap();
        let created = user.updated_at;

        user.bio = "analytical engines".into();
        user.email = "ignored@example.com".into();
        let saved = store.save(&user).await.unwrap();

        assert_eq!(saved.bio, "analytical engines");
        assert_eq!(saved.email, "ada@example.com");
        assert!(saved.updated_at >= created);
    }

    #[tokio::test]
    async fn save_of_unknown_user_fails() {
        let store = MemoryCredentialStore::new();
        let mut user = store.create(record("ada@example.com")).await.unwrap();
        store.remove(user.id).await;
        user.name = "Gone".into();
        assert!(matches!(store.save(&user).await, Err(StoreError::NotFound)));
    }
}
