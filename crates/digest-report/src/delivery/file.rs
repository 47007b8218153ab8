//! Writes the report to disk instead of sending it

use super::ReportDelivery;
use crate::error::DeliveryError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Saves the HTML body to a fixed path, replacing any previous file
#[derive(Debug, Clone)]
pub struct FileDelivery {
    path: PathBuf,
}

impl FileDelivery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportDelivery for FileDelivery {
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), DeliveryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, html_body).await?;
        info!("Wrote \"{subject}\" to {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");
        let delivery = FileDelivery::new(&path);

        delivery.send("Weekly", "<html></html>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");

        delivery.send("Weekly", "<p>second</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>second</p>");
    }
}
