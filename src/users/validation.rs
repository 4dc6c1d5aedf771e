//! Field rules for user records, checked before any store write.

use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_BIO_LEN: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|.(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#
        )
        .unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_password(plain: &str) -> Result<(), FieldError> {
    if plain.is_empty() {
        return Err(FieldError::new("password", "Please add a password"));
    }
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Checks the persisted profile fields. Email is expected already trimmed.
pub fn validate_profile(name: &str, email: &str, bio: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Please add a name"));
    }
    if email.is_empty() {
        errors.push(FieldError::new("email", "Please add an email"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }
    if bio.chars().count() > MAX_BIO_LEN {
        errors.push(FieldError::new("bio", "Bio must not exceed 250 characters"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
