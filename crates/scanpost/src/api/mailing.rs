//! Client for the document API's `external-api/v1/mailing` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{info, warn};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

use super::error::{ApiError, Result};
use super::http::{create_http_client, endpoint};
use super::token::AccessToken;
use crate::classifier::classify;
use crate::config::Config;

pub const MAILING_PATH: &str = "external-api/v1/mailing";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const TITLE_PREFIX: &str = "Scanned ";
pub const SUBMISSION_NOTE: &str = "Scanned document";

/// Result code the orchestrator treats as success.
pub const ACCEPTED_CODE: &str = "204";

/// One base64-encoded PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDocument {
    pub title: String,
    pub mime_type: &'static str,
    pub file: String,
}

impl SubmissionDocument {
    pub fn from_pdf(title: impl Into<String>, content: &[u8]) -> Self {
        Self {
            title: title.into(),
            mime_type: PDF_MIME_TYPE,
            file: BASE64.encode(content),
        }
    }
}

/// JSON body posted for each scanned file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest<'a> {
    pub title: String,
    pub unit: &'a str,
    pub note: &'static str,
    pub scanned_by: &'a str,
    pub documents: &'a [SubmissionDocument],
}

impl<'a> SubmissionRequest<'a> {
    pub fn for_scan(file_name: &'a str, unit: &'a str, document: &'a SubmissionDocument) -> Self {
        Self {
            title: format!("{}{}", TITLE_PREFIX, file_name),
            unit,
            note: SUBMISSION_NOTE,
            scanned_by: classify(file_name),
            documents: std::slice::from_ref(document),
        }
    }
}

/// What the API said about one upload. `code` is the discriminator the
/// orchestrator switches on; `body` is kept for the run log.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub code: String,
    pub body: serde_json::Value,
}

impl UploadResult {
    /// Synthetic result for a 204, which carries no body.
    pub fn accepted() -> Self {
        Self {
            code: ACCEPTED_CODE.to_string(),
            body: json!({ "code": ACCEPTED_CODE }),
        }
    }

    /// Uses the body's `code` field (string or number), or the HTTP status
    /// when the body has none.
    pub fn from_error_body(status: u16, body: serde_json::Value) -> Self {
        let code = match body.get("code") {
            Some(serde_json::Value::String(code)) => code.clone(),
            Some(serde_json::Value::Number(code)) => code.to_string(),
            _ => status.to_string(),
        };
        Self { code, body }
    }

    pub fn is_accepted(&self) -> bool {
        self.code == ACCEPTED_CODE
    }
}

/// Anything that accepts scanned documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn upload(
        &self,
        token: &AccessToken,
        document: &SubmissionDocument,
        unit: &str,
        file_name: &str,
    ) -> Result<UploadResult>;
}

pub struct MailingClient {
    client: Client,
    mailing_url: String,
}

impl MailingClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            endpoint(&config.modulus_url, MAILING_PATH),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn new(mailing_url: String, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client(request_timeout)?,
            mailing_url,
        })
    }

    pub fn mailing_url(&self) -> &str {
        &self.mailing_url
    }
}

#[async_trait]
impl DocumentSink for MailingClient {
    async fn upload(
        &self,
        token: &AccessToken,
        document: &SubmissionDocument,
        unit: &str,
        file_name: &str,
    ) -> Result<UploadResult> {
        let request = SubmissionRequest::for_scan(file_name, unit, document);

        let transport = |e: reqwest::Error| ApiError::Transport {
            endpoint: self.mailing_url.clone(),
            source: e,
        };

        let response = self
            .client
            .post(&self.mailing_url)
            .header(ACCEPT, "application/json")
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        if status == 204 {
            info!("File uploaded successfully: {}", file_name);
            return Ok(UploadResult::accepted());
        }

        let text = response.text().await.map_err(transport)?;
        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse {
                endpoint: self.mailing_url.clone(),
                status,
                reason: e.to_string(),
            })?;

        warn!("Failed to upload file: {} - Response: {}", file_name, body);
        Ok(UploadResult::from_error_body(status, body))
    }
}
