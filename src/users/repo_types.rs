use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_PHOTO: &str = "https://i.ibb.co/4pDNk1/avatar.png";
pub const DEFAULT_PHONE: &str = "+234";
pub const DEFAULT_BIO: &str = "bio";

/// User record as persisted by a credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never leaves the service
    pub photo: String,
    pub phone: String,
    pub bio: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Insert payload. Only a hash can be handed to a store.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub photo: String,
    pub phone: String,
    pub bio: String,
}

impl NewUserRecord {
    pub fn with_defaults(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password_hash,
            photo: DEFAULT_PHOTO.into(),
            phone: DEFAULT_PHONE.into(),
            bio: DEFAULT_BIO.into(),
        }
    }
}

/// Mutation applied to an existing record. `password` is plaintext and is
/// hashed by the service before the record reaches the store.
#[derive(Default, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserChanges")
            .field("name", &self.name)
            .field("photo", &self.photo)
            .field("phone", &self.phone)
            .field("bio", &self.bio)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
