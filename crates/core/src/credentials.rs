//! Sign-in and password-change input checks.
//!
//! The auth service performs the authoritative checks; these only catch
//! input that can never succeed so the round trip is skipped.

use crate::error::CoreError;

/// Minimum password length accepted by the auth service.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate an email/password pair before a sign-in attempt.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), CoreError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CoreError::Validation("Email must not be empty".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(CoreError::Validation(format!(
                "Invalid email address '{email}'"
            )));
        }
    }
    if password.is_empty() {
        return Err(CoreError::Validation("Password must not be empty".to_string()));
    }
    Ok(())
}

/// Validate a replacement password.
pub fn validate_new_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}
