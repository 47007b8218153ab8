//! Report delivery adapters

mod file;
mod smtp;

pub use file::FileDelivery;
pub use smtp::{SmtpConfig, SmtpDelivery, SmtpTls};

use crate::error::DeliveryError;
use async_trait::async_trait;

/// Sends a finished report somewhere
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportDelivery: Send + Sync {
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), DeliveryError>;

    /// Short label for logs
    fn name(&self) -> &str;
}
