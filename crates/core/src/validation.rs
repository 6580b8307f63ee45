//! Custom rules for `validator` derives on input DTOs.
//!
//! Used as `#[validate(custom(function = "guide_core::validation::not_blank"))]`.

use std::borrow::Cow;

use validator::ValidationError;

use crate::nav::validate_link_url;

/// Reject strings that are empty or contain only whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("not_blank").with_message(Cow::Borrowed("Must not be blank")),
        );
    }
    Ok(())
}

/// Accept only absolute `http://` or `https://` URLs.
pub fn http_url(value: &str) -> Result<(), ValidationError> {
    validate_link_url(value)
        .map_err(|e| ValidationError::new("http_url").with_message(Cow::Owned(e.message)))
}
