//! HTTP clients for the Maskinporten token endpoint and the document API.

pub mod error;
pub mod http;
pub mod mailing;
pub mod token;

pub use error::ApiError;
pub use mailing::{
    DocumentSink, MailingClient, SubmissionDocument, SubmissionRequest, UploadResult,
};
pub use token::{AccessToken, MaskinportenClient, TokenGrant, TokenSource};
