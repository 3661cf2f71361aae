//! Gmail SMTP transport.
//!
//! Sends through `smtp.gmail.com` with STARTTLS on port 587, authenticating
//! with a Gmail app password.

use crate::secure_string::SecureString;
use crate::traits::{
    Connector, ConnectorError, ConnectorHealth, ConnectorResult, DeliveryReceipt,
    NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use de_core::{Channel, ValidatedEmail};
use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

const PROVIDER: &str = "gmail";

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "DefendEarth Alerts".to_string()
}

/// Gmail SMTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    /// Gmail address used as the SMTP login and sender.
    #[serde(default)]
    pub user: Option<String>,
    /// App password generated in the Google account settings.
    #[serde(default)]
    pub app_password: Option<SecureString>,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Display name on the From header.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            user: None,
            app_password: None,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            from_name: default_from_name(),
        }
    }
}

impl GmailConfig {
    pub fn is_configured(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty())
            && self.app_password.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// The sender address with its local part masked.
    pub fn masked_user(&self) -> Option<String> {
        let user = self.user.as_deref()?;
        Some(
            ValidatedEmail::new(user)
                .map(|e| e.masked())
                .unwrap_or_else(|_| "***".to_string()),
        )
    }
}

/// Email transport backed by Gmail SMTP.
pub struct GmailTransport {
    config: GmailConfig,
    /// Present only when credentials are configured.
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Option<Mailbox>,
}

impl GmailTransport {
    pub fn new(config: GmailConfig) -> ConnectorResult<Self> {
        if !config.is_configured() {
            warn!("Gmail credentials not configured, email sends will be simulated");
            return Ok(Self {
                config,
                mailer: None,
                sender: None,
            });
        }

        let user = config.user.clone().unwrap_or_default();
        let password = config
            .app_password
            .as_ref()
            .map(|p| p.expose_secret().to_string())
            .unwrap_or_default();

        let address: lettre::Address = user
            .parse()
            .map_err(|e| ConnectorError::ConfigError(format!("Invalid Gmail user: {}", e)))?;
        let sender = Mailbox::new(Some(config.from_name.clone()), address);

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| ConnectorError::ConfigError(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(user, password))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(Self {
            config,
            mailer: Some(mailer),
            sender: Some(sender),
        })
    }

    fn build_message(
        &self,
        sender: &Mailbox,
        message: &OutboundMessage,
    ) -> ConnectorResult<(Message, String)> {
        let recipient: Mailbox = message
            .recipient
            .parse()
            .map_err(|e| ConnectorError::InvalidRequest(format!("Invalid recipient: {}", e)))?;

        let message_id = format!("<{}@defend-earth>", uuid::Uuid::new_v4());
        let builder = Message::builder()
            .from(sender.clone())
            .to(recipient)
            .subject(message.subject.clone().unwrap_or_default())
            .message_id(Some(message_id.clone()));

        let email = match &message.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.body.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.body.clone()),
        }
        .map_err(|e| ConnectorError::InvalidRequest(e.to_string()))?;

        Ok((email, message_id))
    }
}

#[async_trait]
impl Connector for GmailTransport {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn connector_type(&self) -> &str {
        "email"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        let Some(mailer) = &self.mailer else {
            return Ok(ConnectorHealth::Degraded("demo mode".to_string()));
        };
        match mailer.test_connection().await {
            Ok(true) => Ok(ConnectorHealth::Healthy),
            Ok(false) => Ok(ConnectorHealth::Unhealthy(format!(
                "SMTP server {} refused the connection",
                self.config.smtp_host
            ))),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(matches!(self.health_check().await?, ConnectorHealth::Healthy))
    }
}

#[async_trait]
impl NotificationTransport for GmailTransport {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_demo(&self) -> bool {
        self.mailer.is_none()
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        let (Some(mailer), Some(sender)) = (&self.mailer, &self.sender) else {
            info!(recipient = %message.recipient, "Simulating Gmail send");
            return Ok(DeliveryReceipt::demo(PROVIDER));
        };

        let (email, message_id) = self.build_message(sender, message)?;
        mailer.send(email).await.map_err(|e| {
            if e.is_permanent() {
                ConnectorError::RequestFailed(e.to_string())
            } else {
                ConnectorError::ConnectionFailed(e.to_string())
            }
        })?;

        info!(recipient = %message.recipient, %message_id, "Email sent via Gmail");
        Ok(DeliveryReceipt::delivered(PROVIDER, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> GmailConfig {
        GmailConfig {
            user: Some("alerts@gmail.com".to_string()),
            app_password: Some(SecureString::from("abcd efgh ijkl mnop")),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_configured() {
        assert!(!GmailConfig::default().is_configured());
        assert!(configured().is_configured());

        let missing_password = GmailConfig {
            app_password: None,
            ..configured()
        };
        assert!(!missing_password.is_configured());
    }

    #[test]
    fn test_masked_user() {
        assert_eq!(
            configured().masked_user().as_deref(),
            Some("a***@gmail.com")
        );
        assert!(GmailConfig::default().masked_user().is_none());
    }

    #[tokio::test]
    async fn test_demo_send() {
        let transport = GmailTransport::new(GmailConfig::default()).unwrap();
        assert!(transport.is_demo());

        let receipt = transport
            .send(&OutboundMessage::email("user@example.com", "Hi", "Body"))
            .await
            .unwrap();
        assert!(receipt.demo);
        assert!(receipt.message_id.starts_with("demo_gmail_"));
    }

    #[tokio::test]
    async fn test_demo_health_is_degraded() {
        let transport = GmailTransport::new(GmailConfig::default()).unwrap();
        assert!(matches!(
            transport.health_check().await.unwrap(),
            ConnectorHealth::Degraded(_)
        ));
    }

    #[tokio::test]
    async fn test_build_message_with_html() {
        let transport = GmailTransport::new(configured()).unwrap();
        assert!(!transport.is_demo());

        let sender = transport.sender.clone().unwrap();
        let message = OutboundMessage::email("user@example.com", "Impact alert", "Take cover")
            .with_html("<p>Take cover</p>");
        let (_, id) = transport.build_message(&sender, &message).unwrap();
        assert!(id.ends_with("@defend-earth>"));

        let bad = OutboundMessage::email("not an address", "s", "b");
        assert!(matches!(
            transport.build_message(&sender, &bad),
            Err(ConnectorError::InvalidRequest(_))
        ));
    }
}
