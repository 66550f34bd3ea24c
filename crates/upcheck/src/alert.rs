//! Alert delivery interface.
//!
//! The engine only decides *that* an owner must be told about a state
//! change and what the message says. Getting it to their phone is the job
//! of whatever `Alerter` the host wires in.

use async_trait::async_trait;
use tracing::info;

use crate::error::AlertError;
use crate::monitoring::types::{CheckSpec, CheckStatus};

/// Delivers a notification to a subscriber
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn notify(&self, subscriber: &str, message: &str) -> Result<(), AlertError>;
}

/// Human readable message for a state change
pub fn alert_message(spec: &CheckSpec, status: CheckStatus) -> String {
    format!(
        "Alert: your check for {} {} is currently {}.",
        spec.method.as_upper(),
        spec.target(),
        status
    )
}

/// Alerter that only writes the notification to the log.
///
/// Used when no delivery transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    async fn notify(&self, subscriber: &str, message: &str) -> Result<(), AlertError> {
        if subscriber.trim().is_empty() {
            return Err(AlertError::Recipient("empty subscriber".to_string()));
        }
        info!(subscriber, "{message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{HttpMethod, Protocol};
    use std::collections::BTreeSet;

    #[test]
    fn test_alert_message_format() {
        let spec = CheckSpec {
            id: "abcdefghij0123456789".to_string(),
            owner_phone: "5551234567".to_string(),
            protocol: Protocol::Https,
            url: "example.com/health".to_string(),
            method: HttpMethod::Post,
            success_codes: BTreeSet::from([200]),
            timeout_seconds: 1,
        };

        assert_eq!(
            alert_message(&spec, CheckStatus::Down),
            "Alert: your check for POST https://example.com/health is currently down."
        );
        assert_eq!(
            alert_message(&spec, CheckStatus::Up),
            "Alert: your check for POST https://example.com/health is currently up."
        );
    }

    #[tokio::test]
    async fn test_log_alerter_rejects_blank_subscriber() {
        assert!(LogAlerter.notify("5551234567", "hello").await.is_ok());
        assert!(matches!(LogAlerter.notify("  ", "hello").await, Err(AlertError::Recipient(_))));
    }
}
