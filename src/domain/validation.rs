//! Input validation for request payloads.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest message body accepted, in characters.
pub const MAX_BODY_CHARS: usize = 4096;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    // ---
    Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").expect("username pattern is valid")
});

pub fn validate_username(username: &str) -> Result<(), String> {
    // ---
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err("username must be 1-64 characters of letters, digits, '_', '.' or '-'".to_string())
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    // ---
    if password.is_empty() {
        return Err("password must not be empty".to_string());
    }
    // bcrypt only looks at the first 72 bytes
    if password.len() > 72 {
        return Err("password must be at most 72 bytes".to_string());
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    // ---
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

/// Length is measured on the trimmed text, which is what gets stored.
pub fn validate_body(body: &str) -> Result<(), String> {
    // ---
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("body must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_BODY_CHARS {
        return Err(format!("body must be at most {MAX_BODY_CHARS} characters"));
    }
    Ok(())
}
