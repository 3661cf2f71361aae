//! EmailJS REST transport.

use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    Connector, ConnectorConfig, ConnectorHealth, ConnectorResult, DeliveryReceipt,
    NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use de_core::Channel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const PROVIDER: &str = "emailjs";

fn default_base_url() -> String {
    "https://api.emailjs.com".to_string()
}

/// EmailJS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailJsConfig {
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    /// Public key, sent as `user_id`.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Private key, required for server-side calls when strict mode is on.
    #[serde(default)]
    pub private_key: Option<SecureString>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EmailJsConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            template_id: None,
            public_key: None,
            private_key: None,
            base_url: default_base_url(),
        }
    }
}

impl EmailJsConfig {
    pub fn is_configured(&self) -> bool {
        [&self.service_id, &self.template_id, &self.public_key]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    subject: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_html: Option<&'a str>,
}

/// Email transport backed by the EmailJS send endpoint.
pub struct EmailJsTransport {
    config: EmailJsConfig,
    client: Option<HttpClient>,
}

impl EmailJsTransport {
    pub fn new(config: EmailJsConfig) -> ConnectorResult<Self> {
        if !config.is_configured() {
            warn!("EmailJS not configured, email sends will be simulated");
            return Ok(Self {
                config,
                client: None,
            });
        }

        let client = HttpClient::new(ConnectorConfig::new(PROVIDER, &config.base_url))?;
        Ok(Self {
            config,
            client: Some(client),
        })
    }

    fn request<'a>(&'a self, message: &'a OutboundMessage) -> SendRequest<'a> {
        SendRequest {
            service_id: self.config.service_id.as_deref().unwrap_or_default(),
            template_id: self.config.template_id.as_deref().unwrap_or_default(),
            user_id: self.config.public_key.as_deref().unwrap_or_default(),
            access_token: self
                .config
                .private_key
                .as_ref()
                .map(|k| k.expose_secret())
                .filter(|k| !k.is_empty()),
            template_params: TemplateParams {
                to_email: &message.recipient,
                subject: message.subject.as_deref().unwrap_or_default(),
                message: &message.body,
                message_html: message.html_body.as_deref(),
            },
        }
    }
}

#[async_trait]
impl Connector for EmailJsTransport {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn connector_type(&self) -> &str {
        "email"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        if self.client.is_none() {
            return Ok(ConnectorHealth::Degraded("demo mode".to_string()));
        }
        Ok(ConnectorHealth::Unknown)
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(self.client.is_some())
    }
}

#[async_trait]
impl NotificationTransport for EmailJsTransport {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        let Some(client) = &self.client else {
            info!(recipient = %message.recipient, "Simulating EmailJS send");
            return Ok(DeliveryReceipt::demo(PROVIDER));
        };

        // EmailJS answers a successful send with a bare "OK" body.
        client
            .post("/api/v1.0/email/send", &self.request(message))
            .await?;

        let message_id = uuid::Uuid::new_v4().to_string();
        info!(recipient = %message.recipient, %message_id, "Email sent via EmailJS");
        Ok(DeliveryReceipt::delivered(PROVIDER, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> EmailJsConfig {
        EmailJsConfig {
            service_id: Some("service_abc".to_string()),
            template_id: Some("template_xyz".to_string()),
            public_key: Some("pk_123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_payload() {
        let transport = EmailJsTransport::new(configured()).unwrap();
        let message = OutboundMessage::email("a@example.com", "Subject", "Body");
        let json = serde_json::to_value(transport.request(&message)).unwrap();

        assert_eq!(json["service_id"], "service_abc");
        assert_eq!(json["user_id"], "pk_123");
        assert!(json.get("accessToken").is_none());
        assert_eq!(json["template_params"]["to_email"], "a@example.com");
        assert!(json["template_params"].get("message_html").is_none());
    }

    #[test]
    fn test_private_key_sent_as_access_token() {
        let transport = EmailJsTransport::new(EmailJsConfig {
            private_key: Some(SecureString::from("priv")),
            ..configured()
        })
        .unwrap();
        let message = OutboundMessage::email("a@example.com", "S", "B");
        let json = serde_json::to_value(transport.request(&message)).unwrap();
        assert_eq!(json["accessToken"], "priv");
    }

    #[tokio::test]
    async fn test_partial_config_is_demo() {
        let transport = EmailJsTransport::new(EmailJsConfig {
            template_id: None,
            ..configured()
        })
        .unwrap();
        assert!(transport.is_demo());
        let receipt = transport
            .send(&OutboundMessage::email("a@example.com", "S", "B"))
            .await
            .unwrap();
        assert!(receipt.message_id.starts_with("demo_emailjs_"));
    }
}
