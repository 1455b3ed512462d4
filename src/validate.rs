use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Rejects patterns the regex engine cannot compile before they reach the store.
pub fn checked_pattern(field: &str, pattern: &str) -> Result<Regex, AppError> {
    Regex::new(pattern).map_err(|_| AppError::bad_request(format!("invalid pattern for {field}")))
}
