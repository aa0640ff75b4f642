//! # Startup Configuration
//!
//! Settings are read once from environment variables (after `dotenvy` has
//! loaded `.env`). Secrets may instead be supplied through a file named by the
//! matching `*_FILE` variable, see [`crate::utils::secret`].
//!
//! ## Environment Variables
//!
//! - `APP_ENV` - `development` (default), `production` or `test`
//! - `LISTEN_ADDR` - Bind address, defaults to `0.0.0.0:8090`
//! - `STORE_BACKEND` - `postgres` or `memory`; defaults to `postgres` when
//!   `DATABASE_URL` is set
//! - `DATABASE_URL` - PostgreSQL connection string
//! - `MAIL_TRANSPORT` - `log`, `api` or `smtp`; defaults to `api` in
//!   production and `log` otherwise
//! - `MAIL_API_URL`, `MAIL_API_KEY`, `SENDER_EMAIL` - HTTP mail API transport
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_TLS`,
//!   `SENDER_EMAIL` - SMTP transport

use std::env;
use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

use crate::services::email::{
    EmailError, EmailService, ExternalEmailer, LogEmailer, SmtpConfig, SmtpEmailer, SmtpTls,
};
use crate::utils::constant::DEFAULT_LISTEN_ADDR;
use crate::utils::secret::get_secret_with;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Env variable `{0}` should be set")]
    Missing(&'static str),

    #[error("Env variable `{var}` has an unsupported value: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Outgoing mail transport selection.
#[derive(Debug, Clone)]
pub enum MailConfig {
    Log,
    Api {
        api_url: String,
        api_key: SecretString,
        sender_email: String,
    },
    Smtp(SmtpConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub listen_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<SecretString>,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration, resolving variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_env = match lookup("APP_ENV").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("development") => AppEnv::Development,
            Some("production") => AppEnv::Production,
            Some("test") => AppEnv::Test,
            Some(other) => return Err(invalid("APP_ENV", other)),
        };

        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let database_url = get_secret_with(&lookup, "DATABASE_URL_FILE", "DATABASE_URL");
        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(invalid("STORE_BACKEND", other)),
            None if database_url.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Memory,
        };
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let transport = lookup("MAIL_TRANSPORT").unwrap_or_else(|| match app_env {
            AppEnv::Production => "api".to_string(),
            _ => "log".to_string(),
        });
        let mail = match transport.as_str() {
            "log" => MailConfig::Log,
            "api" => MailConfig::Api {
                api_url: required(&lookup, "MAIL_API_URL")?,
                api_key: get_secret_with(&lookup, "MAIL_API_KEY_FILE", "MAIL_API_KEY")
                    .ok_or(ConfigError::Missing("MAIL_API_KEY"))?,
                sender_email: required(&lookup, "SENDER_EMAIL")?,
            },
            "smtp" => MailConfig::Smtp(smtp_config(&lookup)?),
            other => return Err(invalid("MAIL_TRANSPORT", other)),
        };

        Ok(Self {
            app_env,
            listen_addr,
            store_backend,
            database_url,
            mail,
        })
    }

    /// Instantiates the configured mail transport.
    pub fn email_service(&self) -> Result<Arc<dyn EmailService>, EmailError> {
        let service: Arc<dyn EmailService> = match &self.mail {
            MailConfig::Log => {
                info!("Running with [LogEmailer (Mock)]");
                Arc::new(LogEmailer)
            }
            MailConfig::Api {
                api_url,
                api_key,
                sender_email,
            } => {
                info!("Running with [ExternalEmailer]");
                Arc::new(ExternalEmailer::new(
                    api_url.clone(),
                    api_key.clone(),
                    sender_email.clone(),
                ))
            }
            MailConfig::Smtp(smtp) => {
                info!("Running with [SmtpEmailer]");
                Arc::new(SmtpEmailer::new(smtp.clone())?)
            }
        };
        Ok(service)
    }
}

fn smtp_config(lookup: &impl Fn(&str) -> Option<String>) -> Result<SmtpConfig, ConfigError> {
    let port = match lookup("SMTP_PORT") {
        Some(raw) => Some(raw.parse::<u16>().map_err(|_| invalid("SMTP_PORT", &raw))?),
        None => None,
    };
    let tls = match lookup("SMTP_TLS") {
        Some(raw) => SmtpTls::parse(&raw).ok_or_else(|| invalid("SMTP_TLS", &raw))?,
        None => SmtpTls::default(),
    };

    Ok(SmtpConfig {
        host: required(lookup, "SMTP_HOST")?,
        port,
        username: lookup("SMTP_USERNAME"),
        password: get_secret_with(lookup, "SMTP_PASSWORD_FILE", "SMTP_PASSWORD"),
        from: required(lookup, "SENDER_EMAIL")?,
        tls,
    })
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    lookup(var).ok_or(ConfigError::Missing(var))
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}
