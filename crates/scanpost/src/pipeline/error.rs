use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::error::{StorageError, WorkerError};

/// Conditions that abort an upload run. Files already filed stay where
/// they were moved; the rest are left in their unit directories.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to prepare working directory: {0}")]
    Setup(#[from] StorageError),

    #[error("Failed to scan unit directories: {0}")]
    Scan(#[from] WorkerError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Maskinporten token request rejected with status {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("Unrecognized response code {code} for '{file}': {body}")]
    UnrecognizedResponse {
        file: PathBuf,
        code: String,
        body: String,
    },
}
