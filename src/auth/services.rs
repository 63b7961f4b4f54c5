use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn login_request(username: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::Blank("Username"));
    }
    if password.is_empty() {
        return Err(ValidationError::Blank("Password"));
    }
    Ok(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub fn register_request(
    username: &str,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<RegisterRequest, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::Blank("Username"));
    }
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(RegisterRequest {
        username: username.to_string(),
        email,
        password: password.to_string(),
        full_name: full_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    })
}
