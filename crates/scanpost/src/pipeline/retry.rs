//! How an upload response is interpreted and when it earns another attempt.

use crate::api::mailing::ACCEPTED_CODE;

pub const REJECTED_CODE: &str = "400";
pub const AUTH_EXPIRED_CODE: &str = "403";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 204: the document was stored.
    Accepted,
    /// 400: the request itself is bad; retrying would not help.
    Rejected,
    /// 403: the access token is no longer accepted.
    AuthExpired,
    Unrecognized,
}

impl ResponseClass {
    pub fn from_code(code: &str) -> Self {
        match code {
            ACCEPTED_CODE => Self::Accepted,
            REJECTED_CODE => Self::Rejected,
            AUTH_EXPIRED_CODE => Self::AuthExpired,
            _ => Self::Unrecognized,
        }
    }
}

/// Bounded re-authentication. Only [`ResponseClass::AuthExpired`] triggers a
/// retry, and only while attempts remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl RetryPolicy {
    /// `attempt` is 1-based.
    pub fn should_retry(&self, attempt: u32, class: ResponseClass) -> bool {
        class == ResponseClass::AuthExpired && attempt < self.max_attempts
    }
}
