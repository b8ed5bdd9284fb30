//! Owner notifications for inbound contact messages.
//!
//! A `Notifier` is picked once at startup: SMTP when email is configured
//! and an owner address is known, otherwise a notifier that only logs.

mod email;

pub use email::EmailNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::db::ContactMessage;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid mailbox: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),

    #[error("Email is not configured")]
    NotConfigured,
}

/// What the owner is told about a new message
#[derive(Debug, Clone)]
pub struct ContactNotification {
    pub site_title: String,
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub message: String,
    pub received_at: String,
}

impl ContactNotification {
    pub fn from_message(site_title: &str, msg: &ContactMessage) -> Self {
        Self {
            site_title: site_title.to_string(),
            sender_name: msg.sender_name.clone(),
            sender_email: msg.sender_email.clone(),
            subject: msg.subject.clone(),
            message: msg.message.clone(),
            received_at: msg.created_at.clone(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_contact(&self, notification: &ContactNotification) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// Records notifications in the log instead of delivering them
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_contact(&self, notification: &ContactNotification) -> Result<(), NotifyError> {
        tracing::info!(
            from = %notification.sender_email,
            subject = %notification.subject,
            "New contact message (email delivery disabled)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

pub fn from_config(config: &Config) -> Arc<dyn Notifier> {
    match &config.site.owner_email {
        Some(owner) if config.email.is_configured() => {
            Arc::new(EmailNotifier::new(config.email.clone(), owner.clone()))
        }
        _ => Arc::new(LogNotifier),
    }
}

/// Deliver in the background; failures are logged and never reach the caller
pub fn notify_in_background(notifier: Arc<dyn Notifier>, notification: ContactNotification) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify_contact(&notification).await {
            tracing::warn!(
                notifier = notifier.name(),
                error = %e,
                "Failed to send contact notification"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_smtp_logs() {
        let mut config = Config::default();
        config.site.owner_email = Some("owner@example.com".to_string());
        assert_eq!(from_config(&config).name(), "log");

        config.email.smtp_host = Some("smtp.example.com".to_string());
        config.email.from_address = Some("site@example.com".to_string());
        assert_eq!(from_config(&config).name(), "email");

        config.site.owner_email = None;
        assert_eq!(from_config(&config).name(), "log");
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let notification = ContactNotification {
            site_title: "Portfolio".to_string(),
            sender_name: "V".to_string(),
            sender_email: "v@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello".to_string(),
            received_at: crate::db::now(),
        };
        assert!(LogNotifier.notify_contact(&notification).await.is_ok());
    }
}
