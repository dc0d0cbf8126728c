use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, warn};

use super::error::MailerError;

/// PDFs directly inside `folder` whose modification time is older than
/// `now - max_age`, sorted by path. Subdirectories are not searched.
pub fn find_stale_files(
    folder: &Path,
    max_age: Duration,
    now: SystemTime,
) -> Result<Vec<PathBuf>, MailerError> {
    let Some(cutoff) = now.checked_sub(max_age) else {
        return Ok(Vec::new());
    };

    let pattern = format!(
        "{}/*.pdf",
        glob::Pattern::escape(&folder.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|e| MailerError::Pattern {
        pattern: pattern.clone(),
        source: e,
    })?;

    let mut stale = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable entry {}: {}", e.path().display(), e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| MailerError::Io {
                path: path.clone(),
                source: e,
            })?;

        if modified < cutoff {
            debug!("Stale file: {}", path.display());
            stale.push(path);
        }
    }

    stale.sort();
    Ok(stale)
}
