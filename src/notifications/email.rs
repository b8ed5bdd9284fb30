//! SMTP delivery of contact notifications.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{ContactNotification, Notifier, NotifyError};
use crate::config::EmailConfig;

pub struct EmailNotifier {
    config: EmailConfig,
    owner_email: String,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, owner_email: String) -> Self {
        Self {
            config,
            owner_email,
        }
    }

    fn build_message(&self, notification: &ContactNotification) -> Result<Message, NotifyError> {
        let from_address = self
            .config
            .from_address
            .as_ref()
            .ok_or(NotifyError::NotConfigured)?;

        let from_mailbox = format!("{} <{}>", self.config.from_name, from_address);
        let from: Mailbox = from_mailbox
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(from_mailbox.clone()))?;
        let to: Mailbox = self
            .owner_email
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(self.owner_email.clone()))?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(format!(
                "[{}] {}",
                notification.site_title, notification.subject
            ));
        // Replies go straight to the visitor
        if let Ok(reply_to) = notification.sender_email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(render_contact_text(notification)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(render_contact_html(notification)),
                    ),
            )
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify_contact(&self, notification: &ContactNotification) -> Result<(), NotifyError> {
        let smtp_host = self
            .config
            .smtp_host
            .as_ref()
            .ok_or(NotifyError::NotConfigured)?;
        let email = self.build_message(notification)?;

        let mailer = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                .map_err(|e| NotifyError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer
            .build()
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::info!(
            to = %self.owner_email,
            subject = %notification.subject,
            "Contact notification sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

fn render_contact_text(n: &ContactNotification) -> String {
    format!(
        "New message from {name} <{email}>\nReceived: {received}\nSubject: {subject}\n\n{message}\n",
        name = n.sender_name,
        email = n.sender_email,
        received = n.received_at,
        subject = n.subject,
        message = n.message,
    )
}

fn render_contact_html(n: &ContactNotification) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; color: #1f2937;">
  <h2 style="margin-bottom: 4px;">New message on {site}</h2>
  <p style="color: #6b7280; margin-top: 0;">{received}</p>
  <p><strong>From:</strong> {name} &lt;<a href="mailto:{email}">{email}</a>&gt;</p>
  <p><strong>Subject:</strong> {subject}</p>
  <div style="white-space: pre-wrap; border-left: 3px solid #e5e7eb; padding-left: 12px;">{message}</div>
</body>
</html>"#,
        site = html_escape(&n.site_title),
        received = html_escape(&n.received_at),
        name = html_escape(&n.sender_name),
        email = html_escape(&n.sender_email),
        subject = html_escape(&n.subject),
        message = html_escape(&n.message),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> ContactNotification {
        ContactNotification {
            site_title: "Portfolio".to_string(),
            sender_name: "Kim <script>".to_string(),
            sender_email: "kim@example.com".to_string(),
            subject: "Collaboration".to_string(),
            message: "Let's build something.".to_string(),
            received_at: "2024-05-01T09:00:00.000000Z".to_string(),
        }
    }

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            from_address: Some("site@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>"), "&lt;b&gt;");
        assert_eq!(html_escape("Tom & Jerry"), "Tom &amp; Jerry");
    }

    #[test]
    fn test_render_contact_bodies() {
        let n = notification();
        let text = render_contact_text(&n);
        assert!(text.contains("kim@example.com"));
        assert!(text.contains("Let's build something."));

        let html = render_contact_html(&n);
        assert!(html.contains("Kim &lt;script&gt;"));
        assert!(html.contains("Let&#39;s build something."));
    }

    #[test]
    fn test_build_message() {
        let notifier = EmailNotifier::new(config(), "owner@example.com".to_string());
        assert!(notifier.build_message(&notification()).is_ok());

        let bad = EmailNotifier::new(config(), "not an address".to_string());
        assert!(matches!(
            bad.build_message(&notification()),
            Err(NotifyError::InvalidAddress(_))
        ));
    }
}
