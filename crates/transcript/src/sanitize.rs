//! Scrubbing of sensitive values from log output
//!
//! Request URLs, bearer tokens and API keys must never reach the log
//! stream verbatim. Every message logged from the network path goes
//! through [`sanitize_message`] first.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid regex"));
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-._~+/]+=*").expect("valid regex"));
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[A-Za-z0-9]+").expect("valid regex"));
static API_KEY_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)x-api-key:\s*[^\s]+").expect("valid regex"));

/// Mask URLs, bearer tokens and API keys in a message
pub fn sanitize_message(message: &str) -> String {
    let sanitized = URL_RE.replace_all(message, "[URL_HIDDEN]");
    let sanitized = BEARER_RE.replace_all(&sanitized, "Bearer [TOKEN_HIDDEN]");
    let sanitized = API_KEY_RE.replace_all(&sanitized, "sk-[KEY_HIDDEN]");
    let sanitized = API_KEY_HEADER_RE.replace_all(&sanitized, "x-api-key: [KEY_HIDDEN]");
    sanitized.into_owned()
}

/// Whether a message contains anything the sanitizer would mask
pub fn contains_sensitive_info(message: &str) -> bool {
    URL_RE.is_match(message)
        || BEARER_RE.is_match(message)
        || API_KEY_RE.is_match(message)
        || API_KEY_HEADER_RE.is_match(message)
}
