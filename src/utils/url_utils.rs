//! URL and naming helpers used when targeting a feed and storing results.

use anyhow::{Context, Result};
use url::Url;

/// Base address for the pin search feed
pub const SEARCH_FEED_URL: &str = "https://www.pinterest.com/search/pins/";

/// Address of the login page used for optional authentication
pub const LOGIN_URL: &str = "https://www.pinterest.com/login/";

/// Build the search-results feed URL for a free-text query with proper
/// query-string encoding.
pub fn search_feed_url(query: &str) -> Result<String> {
    let mut url = Url::parse(SEARCH_FEED_URL).context("Failed to parse search feed base URL")?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url.into())
}

/// Check if a URL is a plausible http(s) address
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Derive a filesystem-safe slug from a harvest target, used for the
/// default output directory and for artifact filenames.
///
/// For a board URL the trailing path segment is used; for a query the
/// whole string is slugged.
#[must_use]
pub fn target_slug(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    let last_segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let base = if raw.contains("://") { last_segment } else { trimmed };

    let slug = sanitize_filename::sanitize(base.replace(' ', "_"));
    if slug.is_empty() {
        "pin_feed".to_string()
    } else {
        slug
    }
}
