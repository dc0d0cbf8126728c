//! Derives submission metadata from scanner filename conventions.
//!
//! Scanners prefix every file with the five-character id of the person who
//! scanned it, e.g. `ab12c_20240101.pdf`.

/// Label sent as `scannedBy` when the filename carries no valid user id.
pub const UNKNOWN_ACTOR: &str = "unknown";

const USER_ID_LENGTH: usize = 5;

/// Returns true for mixed alphanumeric ids: letters and digits only, with at
/// least one of each.
pub fn is_valid_user_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.chars().all(char::is_alphanumeric)
        && candidate.chars().any(char::is_alphabetic)
        && candidate.chars().any(char::is_numeric)
}

/// Returns the leading user id of `file_name`, or [`UNKNOWN_ACTOR`].
pub fn classify(file_name: &str) -> &str {
    let prefix = match file_name.char_indices().nth(USER_ID_LENGTH) {
        Some((end, _)) => &file_name[..end],
        None => file_name,
    };

    if is_valid_user_id(prefix) {
        prefix
    } else {
        UNKNOWN_ACTOR
    }
}
