//! Emails PDFs that have sat in a folder (typically `Failed/`) for too long.

pub mod error;
pub mod smtp;
pub mod stale;

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use log::info;

use crate::config::MailerConfig;
use crate::secrets::expand_home;

pub use error::MailerError;
pub use smtp::{build_message, StaleFileMailer};
pub use stale::find_stale_files;

/// Sends every stale PDF in `config.folder_path` in one message. Returns the
/// number of files sent; no message goes out when nothing is stale.
pub async fn run_mailer(config: &MailerConfig) -> Result<usize, MailerError> {
    let folder = PathBuf::from(expand_home(&config.folder_path));
    let max_age = Duration::from_secs(config.max_age_hours.saturating_mul(60 * 60));

    let files = find_stale_files(&folder, max_age, SystemTime::now())?;
    if files.is_empty() {
        info!("No old PDF files found.");
        return Ok(0);
    }

    let message = build_message(config, &files)?;
    StaleFileMailer::from_config(config)?.send(message).await?;

    info!("Sent {} old PDF files to {}", files.len(), config.email_to);
    Ok(files.len())
}
