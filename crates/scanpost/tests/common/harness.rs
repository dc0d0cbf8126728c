//! Isolated working directory for upload runs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use scanpost::api::{DocumentSink, TokenSource};
use scanpost::pipeline::UploadOrchestrator;
use scanpost::runlog::RunLog;
use scanpost::storage::{FileStorage, FAILED_DIR, FINISHED_DIR, LOGS_DIR};

pub struct TestHarness {
    temp_dir: TempDir,
}

impl TestHarness {
    /// Creates an empty working directory with Finished/Failed/Logs in place.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        FileStorage::new(temp_dir.path())
            .ensure_layout()
            .expect("Failed to create working directory layout");
        Self { temp_dir }
    }

    pub fn working_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a small PDF-like file into `<unit>/<name>`.
    pub fn write_unit_file(&self, unit: &str, name: &str) -> PathBuf {
        let dir = self.working_dir().join(unit);
        std::fs::create_dir_all(&dir).expect("Failed to create unit dir");
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4\n%test\n").expect("Failed to write unit file");
        path
    }

    pub fn unit_path(&self, unit: &str, name: &str) -> PathBuf {
        self.working_dir().join(unit).join(name)
    }

    pub fn finished_path(&self, name: &str) -> PathBuf {
        self.working_dir().join(FINISHED_DIR).join(name)
    }

    pub fn failed_path(&self, name: &str) -> PathBuf {
        self.working_dir().join(FAILED_DIR).join(name)
    }

    /// Builds an orchestrator over this working directory, appending to
    /// today's log.
    pub fn orchestrator<T, S>(&self, tokens: T, sink: S) -> UploadOrchestrator<T, S>
    where
        T: TokenSource,
        S: DocumentSink,
    {
        let storage = FileStorage::new(self.working_dir());
        let log = RunLog::open(storage.logs_dir()).expect("Failed to open run log");
        UploadOrchestrator::new(storage, tokens, sink, log)
    }

    /// Concatenated contents of every file under `Logs/`.
    pub fn read_logs(&self) -> String {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(self.working_dir().join(LOGS_DIR))
            .expect("Failed to read Logs dir")
            .map(|e| e.expect("Failed to read log entry").path())
            .collect();
        entries.sort();

        entries
            .iter()
            .map(|p| std::fs::read_to_string(p).expect("Failed to read log file"))
            .collect()
    }
}
