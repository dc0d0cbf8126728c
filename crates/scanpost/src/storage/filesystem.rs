use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::StorageError;

pub const FINISHED_DIR: &str = "Finished";
pub const FAILED_DIR: &str = "Failed";
pub const LOGS_DIR: &str = "Logs";

/// Top-level names under the working directory that are never unit directories.
pub const RESERVED_DIRECTORIES: [&str; 3] = [FAILED_DIR, FINISHED_DIR, LOGS_DIR];

/// Terminal location of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Finished,
    Failed,
}

impl Destination {
    pub fn dir_name(self) -> &'static str {
        match self {
            Destination::Finished => FINISHED_DIR,
            Destination::Failed => FAILED_DIR,
        }
    }
}

/// Move a file from `src` to `dst`. Uses `rename` first (fast, atomic on same
/// filesystem). Falls back to copy + delete when rename fails, which covers
/// cross-device moves. A failed fallback leaves only the original behind.
fn move_file(src: &Path, dst: &Path) -> Result<(), StorageError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    let move_error = |e| StorageError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    };

    std::fs::copy(src, dst).map_err(move_error)?;
    if let Err(e) = std::fs::remove_file(src) {
        if let Err(cleanup) = std::fs::remove_file(dst) {
            warn!(
                "Could not remove partial copy {}: {}",
                dst.display(),
                cleanup
            );
        }
        return Err(move_error(e));
    }
    Ok(())
}

/// The working directory and its reserved Finished/Failed/Logs subdirectories.
#[derive(Debug, Clone)]
pub struct FileStorage {
    working_directory: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(working_directory: P) -> Self {
        Self {
            working_directory: working_directory.as_ref().to_path_buf(),
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.working_directory.join(LOGS_DIR)
    }

    pub fn destination_dir(&self, destination: Destination) -> PathBuf {
        self.working_directory.join(destination.dir_name())
    }

    /// Creates Logs, Finished and Failed when they are missing.
    pub fn ensure_layout(&self) -> Result<(), StorageError> {
        self.ensure_directory(&self.logs_dir())?;
        self.ensure_directory(&self.destination_dir(Destination::Finished))?;
        self.ensure_directory(&self.destination_dir(Destination::Failed))?;
        Ok(())
    }

    /// Moves `source_path` into Finished or Failed, keeping its file name.
    /// An existing file of the same name is never overwritten; the new file
    /// gets a `_2`, `_3`, ... suffix instead.
    pub fn file_away<P: AsRef<Path>>(
        &self,
        source_path: P,
        destination: Destination,
    ) -> Result<PathBuf, StorageError> {
        let source_path = source_path.as_ref();
        let target_dir = self.destination_dir(destination);
        self.ensure_directory(&target_dir)?;

        let file_name = source_path
            .file_name()
            .ok_or_else(|| StorageError::NoFileName(source_path.to_path_buf()))?;

        let target_path = self.resolve_conflict(&target_dir, file_name)?;
        move_file(source_path, &target_path)?;

        debug!(
            "Moved {} to {}",
            source_path.display(),
            target_path.display()
        );
        Ok(target_path)
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Returns the first free path for `filename` in `directory`.
    fn resolve_conflict(
        &self,
        directory: &Path,
        filename: &OsStr,
    ) -> Result<PathBuf, StorageError> {
        let path = directory.join(filename);

        // symlink_metadata also catches broken symlinks
        if std::fs::symlink_metadata(&path).is_err() {
            return Ok(path);
        }

        // A leading dot is part of the stem, not an extension
        let name = Path::new(filename);
        let base = name.file_stem().unwrap_or(filename);
        let ext = name.extension();

        for counter in 2..=1000 {
            let mut new_filename = OsString::from(base);
            new_filename.push(format!("_{}", counter));
            if let Some(ext) = ext {
                new_filename.push(".");
                new_filename.push(ext);
            }

            let new_path = directory.join(&new_filename);
            if std::fs::symlink_metadata(&new_path).is_err() {
                return Ok(new_path);
            }
        }

        Err(StorageError::FileExists(path))
    }
}
