/// Notification delivery seam
///
/// Background sweeps talk to a Notifier rather than any concrete channel.
/// The default LogNotifier just writes the message to the log, which keeps
/// the worker useful without SMTP credentials and makes tests trivial.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Errors from notification delivery
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Where outbound notifications go
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to one recipient
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that logs instead of delivering
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!("📬 Notification to {}: {} | {}", to, subject, body);
        Ok(())
    }
}
