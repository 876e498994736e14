//! Shared request validation helpers.

use crate::error::AppError;

/// Maximum accepted URL length for media references.
const MAX_URL_LEN: usize = 2048;

/// Trim a required text field and enforce a character limit.
///
/// Returns the trimmed value.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(format!("{} is required", field)));
    }

    if trimmed.chars().count() > max_chars {
        return Err(AppError::InvalidRequest(format!(
            "{} exceeds {} characters",
            field, max_chars
        )));
    }

    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate a media URL (listing image, story media).
///
/// # Rules
///
/// - Must be valid URL
/// - Must use HTTP or HTTPS
/// - Maximum 2048 characters
pub fn validate_media_url(field: &str, url: &str) -> Result<(), AppError> {
    if url.len() > MAX_URL_LEN {
        return Err(AppError::InvalidRequest(format!(
            "{} exceeds {} characters",
            field, MAX_URL_LEN
        )));
    }

    let parsed = url::Url::parse(url)
        .map_err(|_| AppError::InvalidRequest(format!("{} is not a valid URL", field)))?;

    match parsed.scheme() {
        "https" | "http" => Ok(()),
        _ => Err(AppError::InvalidRequest(format!(
            "{} must use HTTP or HTTPS",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_limits() {
        assert_eq!(required_text("title", "  Merve ", 10).unwrap(), "Merve");
        assert!(required_text("title", "   ", 10).is_err());
        assert!(required_text("title", "abcdefghijk", 10).is_err());
        // limit counts characters, not bytes
        assert!(required_text("title", "ğğğğğ", 5).is_ok());
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn media_urls() {
        assert!(validate_media_url("image_url", "https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_media_url("image_url", "http://localhost:9000/a.jpg").is_ok());
        assert!(validate_media_url("image_url", "ftp://example.com/a.jpg").is_err());
        assert!(validate_media_url("image_url", "not a url").is_err());

        let long = format!("https://example.com/{}", "a".repeat(2048));
        assert!(validate_media_url("image_url", &long).is_err());
    }
}
