pub mod error;
pub mod retry;
pub mod runner;

pub use error::PipelineError;
pub use retry::{ResponseClass, RetryPolicy};
pub use runner::{run_upload, RunSummary, UploadOrchestrator};
