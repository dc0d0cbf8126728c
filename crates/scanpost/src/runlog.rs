//! Append-only operator log, one file per day under `Logs/`.
//!
//! Every entry is a single line `YYYY-MM-DD HH:MM:SS - <message>` and is
//! flushed immediately, so the file reflects the true outcome even when the
//! run aborts. Entries are mirrored to the `log` facade for the console.

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{error, info, warn};

use crate::error::StorageError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Opens (or creates) today's log file in `logs_dir`.
    pub fn open<P: AsRef<Path>>(logs_dir: P) -> Result<Self, StorageError> {
        Self::open_for_date(logs_dir, Local::now().date_naive())
    }

    pub fn open_for_date<P: AsRef<Path>>(logs_dir: P, date: NaiveDate) -> Result<Self, StorageError> {
        let path = logs_dir
            .as_ref()
            .join(format!("{}.log", date.format("%Y-%m-%d")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::OpenLog {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, message: impl Display) {
        let message = message.to_string();
        info!("{}", message);
        self.append(&message);
    }

    pub fn warn(&mut self, message: impl Display) {
        let message = message.to_string();
        warn!("{}", message);
        self.append(&message);
    }

    pub fn error(&mut self, message: impl Display) {
        let message = message.to_string();
        error!("{}", message);
        self.append(&message);
    }

    fn append(&mut self, message: &str) {
        let line = format_entry(Local::now().naive_local(), message);
        // A lost log line must not abort the upload run.
        if let Err(e) = self
            .file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
        {
            warn!("Failed to write to {}: {}", self.path.display(), e);
        }
    }
}

/// Formats one log line, including the trailing newline.
pub fn format_entry(timestamp: NaiveDateTime, message: &str) -> String {
    format!("{} - {}\n", timestamp.format(TIMESTAMP_FORMAT), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_entry() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        assert_eq!(
            format_entry(ts, "Starting uploads..."),
            "2024-03-07 09:05:01 - Starting uploads...\n"
        );
    }

    #[test]
    fn test_open_uses_dated_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        let log = RunLog::open_for_date(temp_dir.path(), date).unwrap();

        assert_eq!(log.path(), temp_dir.path().join("2024-12-31.log"));
        assert!(log.path().exists());
    }

    #[test]
    fn test_entries_are_appended_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        {
            let mut log = RunLog::open_for_date(temp_dir.path(), date).unwrap();
            log.info("first run");
        }
        {
            let mut log = RunLog::open_for_date(temp_dir.path(), date).unwrap();
            log.error("second run");
        }

        let content = std::fs::read_to_string(temp_dir.path().join("2024-01-02.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - first run"));
        assert!(lines[1].ends_with(" - second run"));
        // "YYYY-MM-DD HH:MM:SS - " prefix
        assert_eq!(&lines[0][19..22], " - ");
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = RunLog::open(temp_dir.path().join("no-such-dir"));
        assert!(matches!(result, Err(StorageError::OpenLog { .. })));
    }
}
