//! # Email Service
//!
//! This module provides email sending functionality with multiple implementations.
//! The service trait allows for easy testing and switching between different
//! email providers or mock implementations.
//!
//! ## Implementations
//!
//! - [`LogEmailer`] - Development/testing implementation that logs emails to console
//! - [`ExternalEmailer`] - Production implementation using an external email HTTP API
//! - [`SmtpEmailer`] - Production implementation talking to an SMTP relay
//!
//! ## Usage
//!
//! The transport is selected at startup from the `APP_ENV` and `MAIL_TRANSPORT`
//! environment variables, see [`crate::config`].

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Errors that can occur during email operations
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Content of an outgoing message. `html` is sent as an alternative part
/// when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailBody {
    pub text: String,
    pub html: Option<String>,
}

impl EmailBody {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: None,
        }
    }

    pub fn with_html(text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: Some(html.into()),
        }
    }
}

/// Trait for email sending services
///
/// This trait provides a common interface for different email implementations,
/// allowing the application to switch between real email providers and mock
/// implementations for testing.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an email to the specified recipient.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::SendFailed`] if the email cannot be sent due to
    /// network issues, API errors, or other delivery problems.
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError>;

    /// Checks that the transport is reachable. Transports without a
    /// connection report success.
    async fn verify(&self) -> Result<(), EmailError> {
        Ok(())
    }
}

/// Mock email service for development and testing
///
/// This implementation logs email details to the console instead of sending
/// real emails.
pub struct LogEmailer;

#[async_trait]
impl EmailService for LogEmailer {
    #[instrument(skip(self, body), fields(recipient = %recipient, subject = %subject))]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError> {
        info!("Sending mock email");

        println!("====== MOCK EMAIL SENT ======");
        println!("To: {recipient}");
        println!("Subject: {subject}");
        println!("-----------------------------");
        println!("{}", body.text);
        println!("=============================");

        debug!(has_html = body.html.is_some(), "Mock email logged to console");
        Ok(())
    }
}

/// External email service for production use
///
/// Sends emails through an external email API provider over HTTP.
pub struct ExternalEmailer {
    api_url: String,
    api_key: SecretString,
    sender_email: String,
    http_client: reqwest::Client,
}

impl ExternalEmailer {
    /// Creates a new external email service instance.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL of the email API endpoint
    /// * `api_key` - Authentication key for the email service
    /// * `sender_email` - Email address to use as the sender
    pub fn new(api_url: String, api_key: SecretString, sender_email: String) -> Self {
        info!(
            api_url = %api_url,
            sender_email = %sender_email,
            "Initializing external email service"
        );

        Self {
            api_url,
            api_key,
            sender_email,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailService for ExternalEmailer {
    #[instrument(
        skip(self, body),
        fields(
            recipient = %recipient,
            subject = %subject,
            sender = %self.sender_email
        )
    )]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError> {
        debug!("Preparing to send email via external API");

        let mut content = vec![json!({ "type": "text/plain", "value": body.text })];
        if let Some(html) = &body.html {
            content.push(json!({ "type": "text/html", "value": html }));
        }

        let payload = json!({
            "to": recipient,
            "from": self.sender_email,
            "subject": subject,
            "content": content
        });

        let response = self
            .http_client
            .post(&self.api_url)
            .basic_auth("api", Some(self.api_key.expose_secret()))
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Email sent successfully via external API");
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                let error_body = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error response body".to_string());

                error!(
                    status = %status,
                    error_body = %error_body,
                    "External email API returned error"
                );

                Err(EmailError::SendFailed(format!(
                    "Third party email provider API error: {error_body}"
                )))
            }
            Err(e) => {
                error!(error = %e, "Network request to email API failed");
                Err(EmailError::SendFailed(format!(
                    "Network request error: {e}"
                )))
            }
        }
    }
}

/// Connection security for [`SmtpEmailer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    StartTls,
    /// Implicit TLS (port 465).
    Tls,
    /// Unencrypted, for local relays and test servers only.
    Plain,
}

impl SmtpTls {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "starttls" => Some(SmtpTls::StartTls),
            "tls" => Some(SmtpTls::Tls),
            "none" => Some(SmtpTls::Plain),
            _ => None,
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from: String,
    pub tls: SmtpTls,
}

/// SMTP email service for production use.
pub struct SmtpEmailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailer {
    /// Builds the pooled SMTP transport. No connection is opened until the
    /// first send or [`EmailService::verify`].
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        let mut builder = match config.tls {
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| EmailError::SendFailed(e.to_string()))?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| EmailError::SendFailed(e.to_string()))?,
            SmtpTls::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let Some(username) = config.username {
            let password = config
                .password
                .map(|p| p.expose_secret().to_string())
                .unwrap_or_default();
            builder = builder.credentials(Credentials::new(username, password));
        }

        info!(host = %config.host, from = %config.from, tls = ?config.tls, "Initializing SMTP email service");

        Ok(Self {
            transport: builder.build(),
            from: config.from,
        })
    }
}

#[async_trait]
impl EmailService for SmtpEmailer {
    #[instrument(skip(self, body), fields(recipient = %recipient, subject = %subject))]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError> {
        let from = self
            .from
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(self.from.clone()))?;
        let to = recipient
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(recipient.to_string()))?;

        let builder = Message::builder().from(from).to(to).subject(subject);
        let message = match &body.html {
            Some(html) => {
                builder.multipart(MultiPart::alternative_plain_html(body.text.clone(), html.clone()))
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(body.text.clone()),
        }
        .map_err(|e| EmailError::SendFailed(format!("Failed to build message: {e}")))?;

        match self.transport.send(message).await {
            Ok(_) => {
                info!("Email sent successfully via SMTP");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "SMTP delivery failed");
                Err(EmailError::SendFailed(format!("SMTP error: {e}")))
            }
        }
    }

    async fn verify(&self) -> Result<(), EmailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!("SMTP server refused the connection test");
                Err(EmailError::SendFailed("SMTP connection test failed".into()))
            }
            Err(e) => Err(EmailError::SendFailed(format!("SMTP error: {e}"))),
        }
    }
}
