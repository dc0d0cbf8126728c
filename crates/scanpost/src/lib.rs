pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod mailer;
pub mod pipeline;
pub mod runlog;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod worker;

pub use api::{ApiError, DocumentSink, MailingClient, MaskinportenClient, TokenSource};
pub use classifier::classify;
pub use config::{load_config, load_mailer_config, Config, MailerConfig};
pub use error::{ConfigError, Result, ScanpostError, StorageError, WorkerError};
pub use mailer::{run_mailer, MailerError};
pub use pipeline::{run_upload, PipelineError, RunSummary, UploadOrchestrator};
pub use runlog::RunLog;
pub use secrets::{resolve_secret, SecretError};
