use std::path::PathBuf;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;
use secrecy::ExposeSecret;

use super::error::MailerError;
use crate::api::mailing::PDF_MIME_TYPE;
use crate::config::MailerConfig;
use crate::secrets::resolve_secret;

fn parse_mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address.parse().map_err(|e| MailerError::Address {
        address: address.to_string(),
        source: e,
    })
}

/// One message carrying every file in `files` as a PDF attachment, with a
/// short plain-text body listing them.
pub fn build_message(config: &MailerConfig, files: &[PathBuf]) -> Result<Message, MailerError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&config.email_from)?)
        .subject(config.email_subject.clone());

    let mut recipients = 0;
    for address in config.recipients() {
        builder = builder.to(parse_mailbox(address)?);
        recipients += 1;
    }
    if recipients == 0 {
        return Err(MailerError::NoRecipients);
    }

    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();

    let mut text = format!(
        "The following {} file(s) in {} have not been uploaded:\n",
        files.len(),
        config.folder_path
    );
    for name in &names {
        text.push_str(&format!("- {}\n", name));
    }

    let pdf = ContentType::parse(PDF_MIME_TYPE)?;
    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(text));
    for (path, name) in files.iter().zip(names) {
        let content = std::fs::read(path).map_err(|e| MailerError::Io {
            path: path.clone(),
            source: e,
        })?;
        body = body.singlepart(Attachment::new(name).body(content, pdf.clone()));
    }

    Ok(builder.multipart(body)?)
}

pub struct StaleFileMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl StaleFileMailer {
    /// Resolves the SMTP password and prepares the transport. No connection
    /// is made until [`StaleFileMailer::send`].
    pub fn from_config(config: &MailerConfig) -> Result<Self, MailerError> {
        let password = resolve_secret(
            config.smtp_password.as_deref(),
            config.smtp_password_file.as_deref(),
            config.smtp_password_env_var.as_deref(),
        )?;
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            password.expose_secret().to_string(),
        );

        let transport = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
                .port(config.smtp_port)
                .credentials(credentials)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_server)
                .port(config.smtp_port)
                .credentials(credentials)
                .build()
        };

        info!(
            "SMTP transport ready for {}:{} (starttls: {})",
            config.smtp_server, config.smtp_port, config.starttls
        );
        Ok(Self { transport })
    }

    pub async fn send(&self, message: Message) -> Result<(), MailerError> {
        self.transport.send(message).await?;
        Ok(())
    }
}
