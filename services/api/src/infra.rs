use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use job_board::notifications::{DeliveryReceipt, Notification, Notifier, NotifyError};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notifier that writes every message to the log instead of sending mail.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<DeliveryReceipt, NotifyError> {
        info!(
            from = %notification.from,
            to = %notification.recipients.join(", "),
            subject = %notification.subject,
            "notification"
        );
        Ok(DeliveryReceipt {
            accepted: notification.recipients.len(),
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
