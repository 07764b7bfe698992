//! Local input validation run before any request is sent.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use std::sync::LazyLock;

use regex::Regex;

use crate::net::error::ApiError;
use crate::net::types::{Credentials, PasswordChange, ProfileUpdate, Registration};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// # Errors
///
/// Returns a validation error if either field is empty.
pub fn login(credentials: &Credentials) -> Result<(), ApiError> {
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }
    Ok(())
}

/// # Errors
///
/// Returns a validation error for empty fields, a malformed email, or a short
/// password, checked in that order.
pub fn registration(registration: &Registration) -> Result<(), ApiError> {
    if registration.username.is_empty() || registration.email.is_empty() || registration.password.is_empty() {
        return Err(ApiError::validation("Username, email, and password are required"));
    }
    if !is_valid_email(&registration.email) {
        return Err(ApiError::validation("Please enter a valid email address"));
    }
    if !long_enough(&registration.password) {
        return Err(ApiError::validation("Password must be at least 8 characters long"));
    }
    Ok(())
}

/// # Errors
///
/// Returns a validation error when nothing would change or a provided field
/// is empty or malformed.
pub fn profile_update(update: &ProfileUpdate) -> Result<(), ApiError> {
    if update.username.is_none() && update.email.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }
    if update.username.as_deref().is_some_and(str::is_empty) {
        return Err(ApiError::validation("Username cannot be empty"));
    }
    if let Some(email) = update.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::validation("Please enter a valid email address"));
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns a validation error for empty fields or a short new password.
pub fn password_change(change: &PasswordChange) -> Result<(), ApiError> {
    if change.current_password.is_empty() || change.new_password.is_empty() {
        return Err(ApiError::validation("Current and new password are required"));
    }
    if !long_enough(&change.new_password) {
        return Err(ApiError::validation("Password must be at least 8 characters long"));
    }
    Ok(())
}
