pub mod authentication;
pub mod avatar;
pub mod block_producer;
pub mod comment;
pub mod cors;
pub mod email;
pub mod like;
pub mod moderation;
pub mod password;
pub mod profile;
pub mod registration;
pub mod user;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub(crate) fn require(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("Field {} is required.", field)))
}

pub(crate) fn require_email(value: Option<String>) -> Result<String, AppError> {
    let email = require(value, "email")?;
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(AppError::validation("E-mail address is not valid."));
    }
    Ok(email)
}

pub(crate) fn max_length(value: &str, field: &str, limit: usize) -> Result<(), AppError> {
    if value.chars().count() > limit {
        return Err(AppError::validation(format!(
            "Field {} must contain at most {} characters.",
            field, limit
        )));
    }
    Ok(())
}
