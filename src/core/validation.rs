//! Reusable field validators for request payloads

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

/// Brazilian mobile format: `(XX) 9XXXX-XXXX` with a nonzero area code.
fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\([1-9]{2}\) 9[0-9]{4}-[0-9]{4}$").unwrap())
}

/// Validate a customer phone number.
///
/// Used as a `validator` custom function on order payloads.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some(Cow::Borrowed("invalid phone format, expected (XX) 9XXXX-XXXX"));
        Err(err)
    }
}
