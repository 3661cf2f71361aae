//! TextLocal transport.

use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    DeliveryReceipt, NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use de_core::{Channel, ValidatedPhone};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const PROVIDER: &str = "textlocal";

fn default_base_url() -> String {
    "https://api.textlocal.in".to_string()
}

fn default_sender() -> String {
    "TXTLCL".to_string()
}

/// TextLocal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLocalConfig {
    #[serde(default)]
    pub api_key: Option<SecureString>,
    /// Six-character sender id.
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TextLocalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sender: default_sender(),
            base_url: default_base_url(),
        }
    }
}

impl TextLocalConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    status: String,
    #[serde(default)]
    batch_id: Option<u64>,
    #[serde(default)]
    errors: Vec<TextLocalError>,
}

#[derive(Debug, Deserialize)]
struct TextLocalError {
    code: i64,
    message: String,
}

/// SMS transport backed by the TextLocal send API.
pub struct TextLocalTransport {
    config: TextLocalConfig,
    client: Option<HttpClient>,
}

impl TextLocalTransport {
    pub fn new(config: TextLocalConfig) -> ConnectorResult<Self> {
        if !config.is_configured() {
            warn!("TextLocal API key not configured, SMS sends will be simulated");
            return Ok(Self {
                config,
                client: None,
            });
        }

        // The key travels in the form body, not a header.
        let client = HttpClient::new(ConnectorConfig::new(PROVIDER, &config.base_url))?;
        Ok(Self {
            config,
            client: Some(client),
        })
    }
}

#[async_trait]
impl Connector for TextLocalTransport {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn connector_type(&self) -> &str {
        "sms"
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
impl NotificationTransport for TextLocalTransport {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        let (Some(client), Some(key)) = (&self.client, &self.config.api_key) else {
            info!(recipient = %message.recipient, "Simulating TextLocal send");
            return Ok(DeliveryReceipt::demo(PROVIDER));
        };

        let phone = ValidatedPhone::new(&message.recipient)
            .map_err(|e| ConnectorError::InvalidRequest(e.to_string()))?;
        let form = [
            ("apikey", key.expose_secret()),
            ("numbers", phone.digits()),
            ("message", message.body.as_str()),
            ("sender", self.config.sender.as_str()),
        ];

        let response: SendResponse = client.post_form("/send/", &form).await?;
        if response.status != "success" {
            let detail = response
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConnectorError::RequestFailed(detail));
        }

        let batch_id = response
            .batch_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        info!(recipient = %message.recipient, %batch_id, "SMS sent via TextLocal");
        Ok(DeliveryReceipt::delivered(PROVIDER, batch_id))
    }
}
