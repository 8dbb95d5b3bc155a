use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    pub static ref URL_SCHEME_REGEX: Regex = Regex::new(r"^(?i:https?://)").unwrap();
}

/// Returns true if the query is a link rather than search terms.
/// Only `http` and `https` links count, anything else is searched for.
pub fn is_url(query: &str) -> bool {
    let query = query.trim();

    if !URL_SCHEME_REGEX.is_match(query) || query.contains(char::is_whitespace) {
        return false;
    }

    Url::parse(query)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.contains('.')))
        .unwrap_or(false)
}

/// Shortens the text to at most `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
