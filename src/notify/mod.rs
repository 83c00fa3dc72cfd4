pub mod render;
pub mod smtp;

pub use render::*;
pub use smtp::*;

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::ClassifiedTest;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Invalid email address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Opaque token identifying a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub message_id: String,
}

/// Patient notification seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one summary email covering both result lists.
    async fn send_report(
        &self,
        to: &str,
        out_of_range: &[ClassifiedTest],
        in_range: &[ClassifiedTest],
    ) -> Result<SendReceipt, NotificationError>;
}

/// One captured call to [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentReport {
    pub to: String,
    pub out_of_range: Vec<ClassifiedTest>,
    pub in_range: Vec<ClassifiedTest>,
    pub email: ReportEmail,
}

/// In-memory notifier that renders and records messages instead of sending them.
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentReport>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// Notifier whose sends all fail at the transport.
    pub fn failing(reason: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<SentReport> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_report(
        &self,
        to: &str,
        out_of_range: &[ClassifiedTest],
        in_range: &[ClassifiedTest],
    ) -> Result<SendReceipt, NotificationError> {
        if let Some(reason) = &self.fail_with {
            return Err(NotificationError::Transport(reason.clone()));
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotificationError::Transport("recorder lock poisoned".into()))?;
        sent.push(SentReport {
            to: to.to_string(),
            out_of_range: out_of_range.to_vec(),
            in_range: in_range.to_vec(),
            email: render_report_email(out_of_range, in_range),
        });

        Ok(SendReceipt {
            message_id: format!("<recorded-{}@diagnexus.local>", sent.len()),
        })
    }
}
