//! Announced body length of image responses.
//!
//! The image host does not always close connections cleanly; comparing the
//! received byte count with the announced length is how a truncated page is
//! detected.

use reqwest::header::CONTENT_RANGE;
use reqwest::Response;

/// Announced total size of a response body.
///
/// A `Content-Range` total wins over `Content-Length`. Returns `None` when
/// neither is usable.
pub fn expected_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_total)
        .or_else(|| response.content_length())
}

/// Parse the total size out of a `Content-Range` value.
///
/// ```rust
/// use pixie::utils::parse_content_range_total;
///
/// assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
/// assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// `true` when fewer bytes arrived than were announced.
pub fn is_truncated(expected: Option<u64>, received: u64) -> bool {
    matches!(expected, Some(expected) if received < expected)
}
