//! Errors raised while talking to the token and mailing endpoints.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that leave the run without a usable connection to the remote
/// services. None of them are retried.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The RSA key used to sign assertions could not be read.
    #[error("Failed to read private key '{path}': {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key file did not contain a usable RSA key.
    #[error("Invalid RSA private key '{path}': {source}")]
    InvalidKey {
        path: PathBuf,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection refused, timeout, TLS failure and the like.
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with something that is not the expected JSON.
    #[error("Malformed response from {endpoint} (HTTP {status}): {reason}")]
    MalformedResponse {
        endpoint: String,
        status: u16,
        reason: String,
    },

    #[error("Token response did not contain an access token")]
    MissingAccessToken,
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
