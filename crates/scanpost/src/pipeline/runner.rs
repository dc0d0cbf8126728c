use std::fmt;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info_span, Instrument};

use crate::api::{
    AccessToken, DocumentSink, MailingClient, MaskinportenClient, SubmissionDocument,
    TokenSource, UploadResult,
};
use crate::config::Config;
use crate::runlog::RunLog;
use crate::sanitize;
use crate::storage::{Destination, FileStorage};
use crate::worker::{DirectoryScanner, FileOutcome, FileRecord};

use super::error::PipelineError;
use super::retry::{ResponseClass, RetryPolicy};

/// Counts for one upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub finished: usize,
    pub failed: usize,
    pub left_in_place: usize,
    /// Upload requests sent, retries included.
    pub uploads: usize,
    /// Re-authentications triggered by an expired token.
    pub retries: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Finished(_) => self.finished += 1,
            FileOutcome::Failed(_) => self.failed += 1,
            FileOutcome::LeftInPlace => self.left_in_place += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.finished + self.failed + self.left_in_place
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} finished, {} failed, {} left in place ({} uploads, {} token retries)",
            self.finished, self.failed, self.left_in_place, self.uploads, self.retries
        )
    }
}

/// Drives one sequential pass over every unit directory: scan, upload each
/// PDF, and file it under Finished or Failed.
pub struct UploadOrchestrator<T, S> {
    storage: FileStorage,
    scanner: DirectoryScanner,
    tokens: T,
    sink: S,
    retry: RetryPolicy,
    log: RunLog,
}

impl<T: TokenSource, S: DocumentSink> UploadOrchestrator<T, S> {
    pub fn new(storage: FileStorage, tokens: T, sink: S, log: RunLog) -> Self {
        let scanner = DirectoryScanner::new(storage.working_directory());
        Self {
            storage,
            scanner,
            tokens,
            sink,
            retry: RetryPolicy::default(),
            log,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Runs to completion, or stops at the first condition that makes further
    /// uploads pointless (token failure, transport failure, unknown response).
    pub async fn run(&mut self) -> Result<RunSummary, PipelineError> {
        self.log.info("Starting uploads...");

        let mut token = self.acquire_token().await?;

        let records = match self.scanner.scan() {
            Ok(records) => records,
            Err(e) => {
                self.log.error(format!("Directory scan failed: {}", e));
                return Err(e.into());
            }
        };
        debug!("Found {} file(s) to upload", records.len());

        let mut summary = RunSummary::default();
        for record in &records {
            let span = info_span!("upload",
                job_id = %record.id,
                filename = %sanitize::redact_path(record.path()),
                unit = %record.unit,
            );
            let outcome = self
                .process_file(record, &mut token, &mut summary)
                .instrument(span)
                .await?;
            summary.record(&outcome);
        }

        self.log.info("Uploads done!");
        self.log.info(format!("Summary: {}", summary));
        Ok(summary)
    }

    /// Requests a token and insists on a usable one. Every failure is
    /// written to the run log before it is returned.
    async fn acquire_token(&mut self) -> Result<AccessToken, PipelineError> {
        let grant = match self.tokens.acquire_token().await {
            Ok(grant) => grant,
            Err(e) => {
                self.log
                    .error(format!("Error acquiring Maskinporten token: {}", e));
                return Err(e.into());
            }
        };

        if !grant.is_success() {
            self.log.error(format!(
                "Failed to acquire Maskinporten token. Status code: {}",
                grant.status
            ));
            self.log.error(format!(
                "Maskinporten token request failed with error: {}",
                grant.body
            ));
            return Err(PipelineError::TokenRejected {
                status: grant.status,
                body: grant.body.to_string(),
            });
        }

        match grant.access_token(Utc::now()) {
            Ok(token) => {
                self.log.info("Maskinporten token acquired successfully.");
                Ok(token)
            }
            Err(e) => {
                self.log
                    .error(format!("Error acquiring Maskinporten token: {}", e));
                Err(e.into())
            }
        }
    }

    async fn process_file(
        &mut self,
        record: &FileRecord,
        token: &mut AccessToken,
        summary: &mut RunSummary,
    ) -> Result<FileOutcome, PipelineError> {
        let content = match std::fs::read(record.path()) {
            Ok(content) => content,
            Err(e) => {
                self.log
                    .error(format!("{} failed with OSError: {}", record.file_name, e));
                return Ok(FileOutcome::LeftInPlace);
            }
        };
        let document = SubmissionDocument::from_pdf(&record.file_name, &content);

        let mut attempt = 1;
        loop {
            summary.uploads += 1;
            let result = match self
                .sink
                .upload(token, &document, &record.unit, &record.file_name)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    self.log.error(format!("Error during API request: {}", e));
                    return Err(e.into());
                }
            };

            let class = ResponseClass::from_code(&result.code);
            if self.retry.should_retry(attempt, class) {
                self.log.warn("Maskinporten token expired, retrying...");
                summary.retries += 1;
                *token = self.acquire_token().await?;
                attempt += 1;
                continue;
            }

            return self.settle(record, attempt > 1, class, &result);
        }
    }

    /// Logs the final response for `record` and files it accordingly. An
    /// unrecognized code on the first attempt aborts the run with the file
    /// left untouched; after a retry every non-success lands in Failed.
    fn settle(
        &mut self,
        record: &FileRecord,
        retried: bool,
        class: ResponseClass,
        result: &UploadResult,
    ) -> Result<FileOutcome, PipelineError> {
        let suffix = if retried { " after retry" } else { "" };

        let destination = match class {
            ResponseClass::Accepted => {
                self.log.info(format!(
                    "{} successfully uploaded{}: {}",
                    record.file_name, suffix, result.body
                ));
                Destination::Finished
            }
            ResponseClass::Unrecognized if !retried => {
                self.log.error(format!(
                    "{} failed with error: {}",
                    record.file_name, result.body
                ));
                return Err(PipelineError::UnrecognizedResponse {
                    file: record.path.clone(),
                    code: result.code.clone(),
                    body: result.body.to_string(),
                });
            }
            _ => {
                self.log.error(format!(
                    "{} failed with error{}: {}",
                    record.file_name, suffix, result.body
                ));
                Destination::Failed
            }
        };

        match self.storage.file_away(record.path(), destination) {
            Ok(path) => Ok(match destination {
                Destination::Finished => FileOutcome::Finished(path),
                Destination::Failed => FileOutcome::Failed(path),
            }),
            Err(e) => {
                self.log
                    .error(format!("{} failed with OSError: {}", record.file_name, e));
                Ok(FileOutcome::LeftInPlace)
            }
        }
    }
}

/// Full upload run for `config`: prepares the working directory, opens the
/// day's log, builds the HTTP clients and processes every pending file.
pub async fn run_upload(config: &Config) -> Result<RunSummary, PipelineError> {
    let storage = FileStorage::new(config.working_directory());
    storage.ensure_layout()?;
    let mut log = RunLog::open(storage.logs_dir())?;

    let tokens = match MaskinportenClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            log.error(format!("Error acquiring Maskinporten token: {}", e));
            return Err(e.into());
        }
    };
    let sink = match MailingClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            log.error(format!("Error during API request: {}", e));
            return Err(e.into());
        }
    };

    UploadOrchestrator::new(storage, tokens, sink, log)
        .run()
        .await
}
