//! Helpers for keeping sensitive data out of console logs and span fields.

use std::path::Path;

/// Maximum length for response bodies echoed to the console.
const MAX_BODY_LENGTH: usize = 200;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Truncates a response body so token endpoints cannot flood the console.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_LENGTH) {
        Some((end, _)) => format!("{}... (truncated)", &body[..end]),
        None => body.to_string(),
    }
}
