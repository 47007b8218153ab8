//! Email delivery over SMTP

use super::ReportDelivery;
use crate::error::DeliveryError;
use async_trait::async_trait;
use digest_utils::{EnvError, env_list, env_opt, env_or, env_parse, env_required};
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, instrument};

/// Transport security
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Implicit TLS (port 465)
    Tls,
    /// Upgrade a plain connection (port 587)
    #[default]
    StartTls,
    /// Plain text, for local relays only
    None,
}

impl FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!("unknown SMTP TLS mode '{other}'")),
        }
    }
}

/// SMTP server and addressing
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: Vec<String>,
    pub tls: SmtpTls,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("tls", &self.tls)
            .finish()
    }
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            host: host.into(),
            port: 587,
            username: None,
            password: None,
            from: from.into(),
            to,
            tls: SmtpTls::StartTls,
        }
    }

    /// Read `SMTP_SERVER`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
    /// `SMTP_TLS`, `FROM_EMAIL` and `TO_EMAIL` (comma-separated)
    pub fn from_env() -> Result<Self, EnvError> {
        let to = env_list("TO_EMAIL");
        if to.is_empty() {
            return Err(EnvError::Missing("TO_EMAIL".to_string()));
        }

        Ok(Self {
            host: env_or("SMTP_SERVER", "smtp.office365.com"),
            port: env_parse("SMTP_PORT", 587)?,
            username: env_opt("SMTP_USERNAME"),
            password: env_opt("SMTP_PASSWORD"),
            from: env_required("FROM_EMAIL")?,
            to,
            tls: env_parse("SMTP_TLS", SmtpTls::StartTls)?,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_tls(mut self, tls: SmtpTls) -> Self {
        self.tls = tls;
        self
    }
}

/// Sends the report as one HTML email to every configured recipient
pub struct SmtpDelivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpDelivery {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| DeliveryError::Config(format!("invalid from address '{}': {e}", config.from)))?;

        let to = config
            .to
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>()
                    .map_err(|e| DeliveryError::Config(format!("invalid recipient '{addr}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if to.is_empty() {
            return Err(DeliveryError::Config("no recipients configured".to_string()));
        }

        let mut builder = match config.tls {
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)),
        }
        .map_err(|e| DeliveryError::Config(format!("SMTP transport error: {e}")))?
        .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    fn build_message(&self, subject: &str, html_body: &str) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        builder
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait]
impl ReportDelivery for SmtpDelivery {
    #[instrument(skip(self, html_body), fields(recipients = self.to.len()))]
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), DeliveryError> {
        let message = self.build_message(subject, html_body)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        info!("Email sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
