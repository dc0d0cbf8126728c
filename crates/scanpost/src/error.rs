use std::path::PathBuf;
use thiserror::Error;

/// Top-level failure of a CLI command. Storage, scan and API errors reach
/// here wrapped in [`crate::pipeline::PipelineError`].
#[derive(Error, Debug)]
pub enum ScanpostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Upload run failed: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Mailer error: {0}")]
    Mailer(#[from] crate::mailer::MailerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file '{path}': {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file from '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    #[error("Path has no file name: {0}")]
    NoFileName(PathBuf),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanpostError>;
