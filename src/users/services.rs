use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::password::{hash_password, verify_password},
    error::{AppError, AppResult},
    users::{
        repo::CredentialStore,
        repo_types::{NewUserRecord, User, UserChanges},
        validation::{validate_password, validate_profile},
    },
};

/// Registration input. The password is plaintext until `create_user` hashes it.
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validates, hashes and persists a new account.
pub async fn create_user(store: &dyn CredentialStore, input: NewUser) -> AppResult<User> {
    let email = input.email.trim().to_owned();
    validate_password(&input.password).map_err(|e| AppError::from(vec![e]))?;
    let record = NewUserRecord::with_defaults(input.name, email, String::new());
    validate_profile(&record.name, &record.email, &record.bio)?;

    let password_hash = hash_password(&input.password)?;
    let user = store
        .create(NewUserRecord {
            password_hash,
            ..record
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user)
}

/// Applies `changes` to `user` and saves it. Empty strings keep the current
/// value. When the mutation carries a password it is hashed here, before the
/// record reaches the store.
pub async fn apply_changes(
    store: &dyn CredentialStore,
    mut user: User,
    changes: UserChanges,
) -> AppResult<User> {
    fn pick(current: &mut String, candidate: Option<String>) {
        if let Some(v) = candidate.filter(|v| !v.is_empty()) {
            *current = v;
        }
    }

    pick(&mut user.name, changes.name);
    pick(&mut user.photo, changes.photo);
    pick(&mut user.phone, changes.phone);
    pick(&mut user.bio, changes.bio);
    validate_profile(&user.name, &user.email, &user.bio)?;

    if let Some(plain) = changes.password {
        validate_password(&plain).map_err(|e| AppError::from(vec![e]))?;
        user.password_hash = hash_password(&plain)?;
    }

    Ok(store.save(&user).await?)
}

pub async fn update_profile(
    store: &dyn CredentialStore,
    user_id: Uuid,
    changes: UserChanges,
) -> AppResult<User> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;
    let user = apply_changes(store, user, UserChanges { password: None, ..changes }).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(user)
}

/// Replaces the password after re-verifying the current one. A wrong
/// `old_password` leaves the stored hash untouched.
pub async fn change_password(
    store: &dyn CredentialStore,
    user_id: Uuid,
    old_password: &str,
    new_password: String,
) -> AppResult<()> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found, please signup."))?;

    if !verify_password(old_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change password with wrong old password");
        return Err(AppError::validation("Old password is incorrect."));
    }

    apply_changes(
        store,
        user,
        UserChanges {
            password: Some(new_password),
            ..UserChanges::default()
        },
    )
    .await?;
    info!(user_id = %user_id, "password changed");
    Ok(())
}
