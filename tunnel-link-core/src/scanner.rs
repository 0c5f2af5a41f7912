//! Finds the public URL of a Cloudflare quick tunnel in its log output.
//!
//! The log is append-only, so the most recent session's URL is the last one
//! in the file. Lines are scanned from the end.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const TUNNEL_URL_PATTERN: &str = r"https?://[A-Za-z0-9-]+\.trycloudflare\.com\b";

fn tunnel_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TUNNEL_URL_PATTERN).expect("tunnel URL pattern is valid"))
}

/// URL from the last line of `text` that contains one.
pub fn find_last_url(text: &str) -> Option<String> {
    let re = tunnel_url_regex();
    text.lines()
        .rev()
        .find_map(|line| re.find(line).map(|m| m.as_str().to_string()))
}

/// Reads `path` and returns the most recent tunnel URL in it.
///
/// A missing file is reported and treated as "no URL". Bytes that are not
/// valid UTF-8 are replaced rather than rejected.
pub fn extract_url(path: &Path) -> std::io::Result<Option<String>> {
    if !path.exists() {
        warn!(log_file = %path.display(), "Tunnel log file not found");
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    debug!(log_file = %path.display(), bytes = bytes.len(), "Scanning tunnel log");

    let url = find_last_url(&text);
    match &url {
        Some(u) => info!(url = %u, "Tunnel URL found in log"),
        None => warn!(log_file = %path.display(), "No tunnel URL in log"),
    }
    Ok(url)
}
