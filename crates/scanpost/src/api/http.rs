use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;

use super::error::{ApiError, Result};

/// Sent on every request so the remote side can tell client versions apart.
pub const USER_AGENT: &str = concat!("scanpost/", env!("CARGO_PKG_VERSION"));

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates an HTTP client that never follows redirects.
pub fn create_http_client(request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .redirect(Policy::none())
        .build()
        .map_err(ApiError::Client)
}

/// Appends `path` to `base`, inserting a `/` only when `base` lacks one.
pub fn endpoint(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_with_trailing_slash() {
        assert_eq!(
            endpoint("https://test.maskinporten.no/", "token"),
            "https://test.maskinporten.no/token"
        );
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        assert_eq!(
            endpoint("https://modulus.example.com", "external-api/v1/mailing"),
            "https://modulus.example.com/external-api/v1/mailing"
        );
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("scanpost/"));
        assert!(USER_AGENT.len() > "scanpost/".len());
    }

    #[test]
    fn test_create_http_client() {
        assert!(create_http_client(Duration::from_secs(5)).is_ok());
    }
}
