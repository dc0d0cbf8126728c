use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Longest assertion lifetime accepted for `timeout`, one day.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Upload configuration, read from `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one subdirectory per unit, plus Finished/Failed/Logs.
    pub working_directory: String,
    /// PEM file with the RSA key used to sign token assertions.
    pub private_key_file: String,
    /// Lifetime of a signed assertion, in seconds.
    #[serde(deserialize_with = "deserialize_seconds")]
    pub timeout: u64,
    pub maskinporten_url: String,
    pub maskinporten_scope: String,
    pub maskinporten_issuer: String,
    pub maskinporten_kid: String,
    pub modulus_url: String,
    /// Timeout applied to every HTTP request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn working_directory(&self) -> PathBuf {
        PathBuf::from(&self.working_directory)
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// Stale-file mailer configuration, read from `email_config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub folder_path: String,
    pub email_from: String,
    /// One address, or several separated by commas.
    pub email_to: String,
    pub email_subject: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_password_file: Option<String>,
    #[serde(default)]
    pub smtp_password_env_var: Option<String>,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_true")]
    pub starttls: bool,
}

impl MailerConfig {
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.email_to
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn default_max_age_hours() -> u64 {
    24
}

fn default_true() -> bool {
    true
}

/// Accepts `"timeout": 120` as well as `"timeout": "120"`.
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid timeout '{}': {}", s, e))),
    }
}
