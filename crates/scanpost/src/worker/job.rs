use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A PDF discovered in a unit directory, waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Correlates console and span output for one file.
    pub id: String,
    pub path: PathBuf,
    pub file_name: String,
    /// Name of the unit directory the file was found in.
    pub unit: String,
}

impl FileRecord {
    pub fn new(path: PathBuf, unit: impl Into<String>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4().to_string(),
            path,
            file_name,
            unit: unit.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Where a file ended up after this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Finished(PathBuf),
    Failed(PathBuf),
    /// An OS error prevented reading or moving; the next run picks it up again.
    LeftInPlace,
}
