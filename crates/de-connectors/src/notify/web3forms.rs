//! Web3Forms transport.
//!
//! Web3Forms delivers to the inbox registered with the access key; the
//! intended recipient travels in the `email` field.

use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    DeliveryReceipt, NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use de_core::Channel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const PROVIDER: &str = "web3forms";

fn default_base_url() -> String {
    "https://api.web3forms.com".to_string()
}

fn default_from_name() -> String {
    "DefendEarth Alerts".to_string()
}

/// Web3Forms configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Web3FormsConfig {
    #[serde(default)]
    pub access_key: Option<SecureString>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Web3FormsConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            from_name: default_from_name(),
            base_url: default_base_url(),
        }
    }
}

impl Web3FormsConfig {
    pub fn is_configured(&self) -> bool {
        self.access_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    access_key: &'a str,
    subject: &'a str,
    from_name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    success: bool,
    #[serde(default)]
    message: String,
}

/// Email transport backed by the Web3Forms submit endpoint.
pub struct Web3FormsTransport {
    config: Web3FormsConfig,
    client: Option<HttpClient>,
}

impl Web3FormsTransport {
    pub fn new(config: Web3FormsConfig) -> ConnectorResult<Self> {
        if !config.is_configured() {
            warn!("Web3Forms access key not configured, email sends will be simulated");
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
}

#[async_trait]
impl Connector for Web3FormsTransport {
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
impl NotificationTransport for Web3FormsTransport {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        let (Some(client), Some(key)) = (&self.client, &self.config.access_key) else {
            info!(recipient = %message.recipient, "Simulating Web3Forms send");
            return Ok(DeliveryReceipt::demo(PROVIDER));
        };

        let request = SubmitRequest {
            access_key: key.expose_secret(),
            subject: message.subject.as_deref().unwrap_or("DefendEarth"),
            from_name: &self.config.from_name,
            email: &message.recipient,
            message: &message.body,
        };

        let response: SubmitResponse = client.post_json("/submit", &request).await?;
        if !response.success {
            return Err(ConnectorError::RequestFailed(response.message));
        }

        let message_id = uuid::Uuid::new_v4().to_string();
        info!(recipient = %message.recipient, %message_id, "Email sent via Web3Forms");
        Ok(DeliveryReceipt::delivered(PROVIDER, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let parsed: SubmitResponse =
            serde_json::from_str(r#"{"success":false,"message":"Invalid access key"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.message, "Invalid access key");
    }

    #[tokio::test]
    async fn test_demo_send() {
        let transport = Web3FormsTransport::new(Web3FormsConfig::default()).unwrap();
        assert!(transport.is_demo());
        let receipt = transport
            .send(&OutboundMessage::email("a@example.com", "S", "B"))
            .await
            .unwrap();
        assert!(receipt.message_id.starts_with("demo_web3forms_"));
    }

    #[test]
    fn test_configured_is_live() {
        let transport = Web3FormsTransport::new(Web3FormsConfig {
            access_key: Some(SecureString::from("00000000-0000-0000-0000-000000000000")),
            ..Default::default()
        })
        .unwrap();
        assert!(!transport.is_demo());
    }
}
