//! Maskinporten JWT-bearer token acquisition.
//!
//! The client signs a short-lived assertion with its RSA key and exchanges it
//! at `{maskinportenUrl}token` for an access token (RFC 7523).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::{debug, info, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, Result};
use super::http::{create_http_client, endpoint};
use crate::config::Config;
use crate::sanitize::truncate_body;
use crate::secrets::expand_home;

/// RFC 7523 JWT bearer grant type.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claims of the signed assertion sent to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub aud: String,
    pub scope: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Static inputs for every assertion this client signs.
#[derive(Debug, Clone)]
pub struct AssertionSettings {
    pub audience: String,
    pub scope: String,
    pub issuer: String,
    pub key_id: String,
    pub lifetime: Duration,
}

impl AssertionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            audience: config.maskinporten_url.clone(),
            scope: config.maskinporten_scope.clone(),
            issuer: config.maskinporten_issuer.clone(),
            key_id: config.maskinporten_kid.clone(),
            lifetime: Duration::from_secs(config.timeout),
        }
    }

    /// Builds fresh claims issued at `now`, each with a new `jti`.
    pub fn claims_at(&self, now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        let exp = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .unwrap_or(i64::MAX);
        AssertionClaims {
            aud: self.audience.clone(),
            scope: self.scope.clone(),
            iss: self.issuer.clone(),
            exp,
            iat,
            jti: new_jti(),
        }
    }
}

/// A random request id in grouped-hex form (`8-4-4-4-12`).
///
/// Drawn from the OS CSPRNG, so it does not depend on the clock.
pub fn new_jti() -> String {
    Uuid::new_v4().to_string()
}

/// Bearer token for the mailing API.
#[derive(Debug)]
pub struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    /// Best-effort expiry. The server may revoke earlier, which shows up as 403.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Raw outcome of a token request: the HTTP status and the JSON body.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub status: u16,
    pub body: serde_json::Value,
}

impl TokenGrant {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Extracts `access_token`. `expires_in`, when present, sets the expiry
    /// relative to `now`.
    pub fn access_token(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        let value = self
            .body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::MissingAccessToken)?;

        let expires_in = self
            .body
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        // Out-of-range lifetimes count as already expired
        let expires_at = chrono::Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now);

        Ok(AccessToken::new(value, expires_at))
    }
}

/// Anything that can hand out access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn acquire_token(&self) -> Result<TokenGrant>;
}

/// Reads and parses the PEM-encoded RSA key at `path` (`~` is expanded).
pub fn load_signing_key(path: &str) -> Result<EncodingKey> {
    let path = PathBuf::from(expand_home(path));
    let pem = std::fs::read(&path).map_err(|e| ApiError::ReadKey {
        path: path.clone(),
        source: e,
    })?;
    EncodingKey::from_rsa_pem(&pem).map_err(|e| ApiError::InvalidKey { path, source: e })
}

pub struct MaskinportenClient {
    client: Client,
    token_url: String,
    settings: AssertionSettings,
    signing_key: EncodingKey,
}

impl MaskinportenClient {
    /// Loads the signing key once; a missing or invalid key fails here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let signing_key = load_signing_key(&config.private_key_file)?;
        Self::new(
            AssertionSettings::from_config(config),
            endpoint(&config.maskinporten_url, "token"),
            signing_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn new(
        settings: AssertionSettings,
        token_url: String,
        signing_key: EncodingKey,
        request_timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: create_http_client(request_timeout)?,
            token_url,
            settings,
            signing_key,
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Signs a new RS256 assertion issued at `now`, with `kid` in the header.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.settings.key_id.clone());

        let claims = self.settings.claims_at(now);
        debug!("Signing assertion jti={} exp={}", claims.jti, claims.exp);

        encode(&header, &claims, &self.signing_key).map_err(ApiError::Signing)
    }
}

#[async_trait]
impl TokenSource for MaskinportenClient {
    async fn acquire_token(&self) -> Result<TokenGrant> {
        let assertion = self.sign_assertion(Utc::now())?;
        let params = [
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion.as_str()),
        ];

        info!("Requesting access token from {}", self.token_url);

        let transport = |e: reqwest::Error| ApiError::Transport {
            endpoint: self.token_url.clone(),
            source: e,
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport)?;

        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse {
                endpoint: self.token_url.clone(),
                status,
                reason: format!("{}: {}", e, truncate_body(&text)),
            })?;

        if status == 200 {
            info!("Maskinporten token acquired successfully");
        } else {
            warn!(
                "Failed to acquire Maskinporten token. Status code: {} ({})",
                status,
                truncate_body(&text)
            );
        }

        Ok(TokenGrant { status, body })
    }
}
