//! Best-effort outbound notifications.
//!
//! Delivery never fails the operation that triggered it: [`dispatch`] reports
//! what happened and logs failures, and callers only record the outcome.

pub mod messages;

use serde::{Deserialize, Serialize};

/// Outbound message handed to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub from: String,
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub accepted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Transport seam (SMTP, queue, log sink).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<DeliveryReceipt, NotifyError>;
}

/// What happened to a single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { accepted: usize },
    /// No recipient had an address.
    Skipped,
    Failed { error: String },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent { .. })
    }
}

/// Send `notification`, dropping blank recipients. Errors are logged and returned as
/// [`Delivery::Failed`], never propagated.
pub fn dispatch<N>(notifier: &N, mut notification: Notification) -> Delivery
where
    N: Notifier + ?Sized,
{
    notification
        .recipients
        .retain(|recipient| !recipient.trim().is_empty());
    if notification.recipients.is_empty() {
        tracing::debug!(subject = %notification.subject, "notification skipped: no recipients");
        return Delivery::Skipped;
    }

    match notifier.notify(&notification) {
        Ok(receipt) => Delivery::Sent {
            accepted: receipt.accepted,
        },
        Err(error) => {
            tracing::warn!(
                subject = %notification.subject,
                recipients = notification.recipients.len(),
                %error,
                "notification delivery failed"
            );
            Delivery::Failed {
                error: error.to_string(),
            }
        }
    }
}
