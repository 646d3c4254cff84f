//! Destination URL validation and normalization.

use url::Url;

/// Longest destination accepted, measured after normalization.
pub const MAX_DESTINATION_LENGTH: usize = 2048;

/// Errors that can occur while normalizing a destination.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS destinations are allowed")]
    UnsupportedProtocol,

    #[error("Destination must include a host")]
    MissingHost,

    #[error("Destination must be at most {MAX_DESTINATION_LENGTH} characters")]
    TooLong,
}

/// Normalizes a destination URL to the form that is stored.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is trimmed
/// 2. **Protocol**: Only HTTP and HTTPS are allowed
/// 3. **Hostname**: Lowercased, default ports (80/443) dropped
/// 4. **Path**: An empty path becomes `/`, case is preserved
/// 5. **Query and fragment**: Preserved
/// 6. **Length**: The normalized form must fit in [`MAX_DESTINATION_LENGTH`]
///
/// Rejects `javascript:`, `data:`, `vbscript:`, `file:`, `ftp:` and friends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_destination("  HTTPS://EXAMPLE.COM:443/Path#top ").unwrap(),
///     "https://example.com/Path#top"
/// );
/// ```
pub fn normalize_destination(input: &str) -> Result<String, UrlNormalizationError> {
    let url = Url::parse(input.trim())
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    let normalized = url.to_string();
    if normalized.len() > MAX_DESTINATION_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    Ok(normalized)
}
