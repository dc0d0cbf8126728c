//! Scripted stand-ins for the token and mailing endpoints.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use scanpost::api::error::Result as ApiResult;
use scanpost::api::{
    AccessToken, ApiError, DocumentSink, SubmissionDocument, TokenGrant, TokenSource,
    UploadResult,
};

/// Hands out `token-1`, `token-2`, ... unless a scripted grant is queued.
pub struct ScriptedTokens {
    grants: Mutex<VecDeque<TokenGrant>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTokens {
    pub fn ok() -> Self {
        Self::with_grants(Vec::new())
    }

    /// Queued grants are returned first, in order.
    pub fn with_grants(grants: Vec<TokenGrant>) -> Self {
        Self {
            grants: Mutex::new(grants.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of `acquire_token` calls; stays valid after the fake
    /// is moved into an orchestrator.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

pub fn ok_grant(access_token: &str) -> TokenGrant {
    TokenGrant {
        status: 200,
        body: json!({"access_token": access_token, "expires_in": 120}),
    }
}

pub fn rejected_grant(status: u16) -> TokenGrant {
    TokenGrant {
        status,
        body: json!({"error": "invalid_client", "error_description": "Unknown client"}),
    }
}

#[async_trait]
impl TokenSource for ScriptedTokens {
    async fn acquire_token(&self) -> ApiResult<TokenGrant> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(grant) = self.grants.lock().unwrap().pop_front() {
            return Ok(grant);
        }
        Ok(ok_grant(&format!("token-{}", n)))
    }
}

/// One scripted reply from the mailing endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Code(&'static str),
    Body(u16, Value),
    TransportFailure,
}

/// What the orchestrator sent for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub token: String,
    pub unit: String,
    pub file_name: String,
    pub document_title: String,
}

/// Answers with the queued replies, then 204 for everything after.
pub struct ScriptedSink {
    replies: Mutex<VecDeque<Reply>>,
    calls: Arc<Mutex<Vec<UploadCall>>>,
}

impl ScriptedSink {
    pub fn accepting() -> Self {
        Self::with_replies(Vec::new())
    }

    pub fn with_codes(codes: &[&'static str]) -> Self {
        Self::with_replies(codes.iter().copied().map(Reply::Code).collect())
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<UploadCall>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl DocumentSink for ScriptedSink {
    async fn upload(
        &self,
        token: &AccessToken,
        document: &SubmissionDocument,
        unit: &str,
        file_name: &str,
    ) -> ApiResult<UploadResult> {
        self.calls.lock().unwrap().push(UploadCall {
            token: token.secret().to_string(),
            unit: unit.to_string(),
            file_name: file_name.to_string(),
            document_title: document.title.clone(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Code("204"));

        match reply {
            Reply::Code("204") => Ok(UploadResult::accepted()),
            Reply::Code(code) => Ok(UploadResult::from_error_body(
                code.parse().unwrap_or(500),
                json!({"code": code, "message": format!("scripted {}", code)}),
            )),
            Reply::Body(status, body) => Ok(UploadResult::from_error_body(status, body)),
            Reply::TransportFailure => Err(ApiError::MalformedResponse {
                endpoint: "http://localhost/external-api/v1/mailing".to_string(),
                status: 502,
                reason: "connection reset".to_string(),
            }),
        }
    }
}
