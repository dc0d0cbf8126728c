use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::schema::{Config, MailerConfig, MAX_TIMEOUT_SECS};
use crate::error::ConfigError;
use crate::secrets::has_secret_source;

const UPLOAD_SCHEMA_JSON: &str = include_str!("../../../../schema/upload-config-v1.json");
const MAILER_SCHEMA_JSON: &str = include_str!("../../../../schema/mailer-config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = read_file(path.as_ref())?;
    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = parse_validated(content, UPLOAD_SCHEMA_JSON)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_mailer_config<P: AsRef<Path>>(path: P) -> Result<MailerConfig, ConfigError> {
    let content = read_file(path.as_ref())?;
    load_mailer_config_from_str(&content)
}

pub fn load_mailer_config_from_str(content: &str) -> Result<MailerConfig, ConfigError> {
    let config: MailerConfig = parse_validated(content, MAILER_SCHEMA_JSON)?;
    validate_mailer_config(&config)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_validated<T: DeserializeOwned>(content: &str, schema: &str) -> Result<T, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value, schema)?;

    Ok(serde_json::from_value(json_value)?)
}

fn validate_schema(json_value: &serde_json::Value, schema: &str) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(schema).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.timeout == 0 {
        return Err(ConfigError::Validation {
            message: "timeout must be at least one second".to_string(),
        });
    }
    if config.timeout > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation {
            message: format!(
                "timeout must be at most {} seconds, got {}",
                MAX_TIMEOUT_SECS, config.timeout
            ),
        });
    }

    for (key, url) in [
        ("maskinportenUrl", &config.maskinporten_url),
        ("modulusUrl", &config.modulus_url),
    ] {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::Validation {
                message: format!("{} must be an http(s) URL, got '{}'", key, url),
            });
        }
    }

    for (key, value) in [
        ("workingDirectory", &config.working_directory),
        ("privateKeyFile", &config.private_key_file),
        ("maskinportenScope", &config.maskinporten_scope),
        ("maskinportenIssuer", &config.maskinporten_issuer),
        ("maskinportenKid", &config.maskinporten_kid),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: format!("{} must not be blank", key),
            });
        }
    }

    Ok(())
}

fn validate_mailer_config(config: &MailerConfig) -> Result<(), ConfigError> {
    if config.recipients().next().is_none() {
        return Err(ConfigError::Validation {
            message: "email_to must contain at least one address".to_string(),
        });
    }

    if !has_secret_source(
        config.smtp_password.as_deref(),
        config.smtp_password_file.as_deref(),
        config.smtp_password_env_var.as_deref(),
    ) {
        return Err(ConfigError::Validation {
            message: "one of smtp_password, smtp_password_file or smtp_password_env_var is required"
                .to_string(),
        });
    }

    Ok(())
}
