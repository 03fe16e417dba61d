use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// Endpoint used when none is configured.
pub const DEFAULT_PLAYGROUND_ENDPOINT: &str = "http://localhost:7777";

const PLAYGROUND_PREFIX: &str = "/v1/playground";

/// Normalize a user-entered endpoint into an absolute base URL.
///
/// Normalization rules:
/// 1) empty input yields an empty string
/// 2) keep an explicit `http://` or `https://` scheme, percent-decoded
/// 3) prefix `http://` for `localhost` or a dotted IPv4 address
/// 4) prefix `https://` otherwise
pub fn construct_endpoint_url(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }

    let decoded = percent_decode(value);
    if value.starts_with("http://") || value.starts_with("https://") {
        return decoded;
    }
    if value.starts_with("localhost") || starts_with_ipv4(value) {
        return format!("http://{decoded}");
    }
    format!("https://{decoded}")
}

pub fn status_url(base: &str) -> String {
    format!("{}{PLAYGROUND_PREFIX}/status", trim_base(base))
}

pub fn agents_url(base: &str) -> String {
    format!("{}{PLAYGROUND_PREFIX}/agents", trim_base(base))
}

pub fn agent_run_url(base: &str, agent_id: &str) -> String {
    format!("{}{PLAYGROUND_PREFIX}/agents/{agent_id}/runs", trim_base(base))
}

pub fn sessions_url(base: &str, agent_id: &str) -> String {
    format!(
        "{}{PLAYGROUND_PREFIX}/agents/{agent_id}/sessions",
        trim_base(base)
    )
}

/// Route for fetching or deleting one session.
pub fn session_url(base: &str, agent_id: &str, session_id: &str) -> String {
    format!("{}/{session_id}", sessions_url(base, agent_id))
}

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

fn ipv4_prefix_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("ipv4 regex must compile")
    })
}

fn starts_with_ipv4(value: &str) -> bool {
    ipv4_prefix_regex().is_match(value)
}

// Invalid escapes pass through; a non-UTF-8 result keeps the raw value.
fn percent_decode(value: &str) -> String {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
