//! Fast2SMS transport (Indian numbers, quick route).

use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    AuthConfig, Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    DeliveryReceipt, NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use de_core::{Channel, ValidatedPhone};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const PROVIDER: &str = "fast2sms";

fn default_base_url() -> String {
    "https://www.fast2sms.com".to_string()
}

fn default_route() -> String {
    "q".to_string()
}

/// Fast2SMS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fast2SmsConfig {
    #[serde(default)]
    pub api_key: Option<SecureString>,
    /// Delivery route; `q` is the quick transactional route.
    #[serde(default = "default_route")]
    pub route: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Fast2SmsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            route: default_route(),
            base_url: default_base_url(),
        }
    }
}

impl Fast2SmsConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    route: &'a str,
    message: &'a str,
    language: &'a str,
    flash: u8,
    numbers: &'a str,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(rename = "return")]
    ok: bool,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    message: serde_json::Value,
}

impl BulkResponse {
    fn message_text(&self) -> String {
        match &self.message {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        }
    }
}

/// SMS transport backed by the Fast2SMS bulk API.
pub struct Fast2SmsTransport {
    config: Fast2SmsConfig,
    client: Option<HttpClient>,
}

impl Fast2SmsTransport {
    pub fn new(config: Fast2SmsConfig) -> ConnectorResult<Self> {
        let Some(key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
            warn!("Fast2SMS API key not configured, SMS sends will be simulated");
            return Ok(Self {
                config,
                client: None,
            });
        };

        let auth = AuthConfig::ApiKey {
            key,
            header_name: "authorization".to_string(),
        };
        let client =
            HttpClient::new(ConnectorConfig::new(PROVIDER, &config.base_url).with_auth(auth))?;

        Ok(Self {
            config,
            client: Some(client),
        })
    }
}

/// Fast2SMS accepts ten-digit national numbers only.
fn national_number(recipient: &str) -> ConnectorResult<String> {
    let phone = ValidatedPhone::new(recipient)
        .map_err(|e| ConnectorError::InvalidRequest(e.to_string()))?;
    Ok(phone.national_number().to_string())
}

#[async_trait]
impl Connector for Fast2SmsTransport {
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
impl NotificationTransport for Fast2SmsTransport {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        let Some(client) = &self.client else {
            info!(recipient = %message.recipient, "Simulating Fast2SMS send");
            return Ok(DeliveryReceipt::demo(PROVIDER));
        };

        let numbers = national_number(&message.recipient)?;
        let request = BulkRequest {
            route: &self.config.route,
            message: &message.body,
            language: "english",
            flash: 0,
            numbers: &numbers,
        };

        let response: BulkResponse = client.post_json("/dev/bulkV2", &request).await?;
        if !response.ok {
            return Err(ConnectorError::RequestFailed(response.message_text()));
        }

        let request_id = response
            .request_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        info!(recipient = %message.recipient, %request_id, "SMS sent via Fast2SMS");
        Ok(DeliveryReceipt::delivered(PROVIDER, request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_number() {
        assert_eq!(national_number("+919876543210").unwrap(), "9876543210");
        assert!(national_number("98765").is_err());
    }

    #[test]
    fn test_parse_responses() {
        let ok: BulkResponse = serde_json::from_str(
            r#"{"return":true,"request_id":"lwdtp7cjyqxvfe9","message":["SMS sent successfully."]}"#,
        )
        .unwrap();
        assert!(ok.ok);
        assert_eq!(ok.message_text(), "SMS sent successfully.");

        let err: BulkResponse =
            serde_json::from_str(r#"{"return":false,"status_code":412,"message":"Invalid Authentication"}"#)
                .unwrap();
        assert!(!err.ok);
        assert_eq!(err.message_text(), "Invalid Authentication");
    }

    #[tokio::test]
    async fn test_demo_send() {
        let transport = Fast2SmsTransport::new(Fast2SmsConfig::default()).unwrap();
        assert!(transport.is_demo());
        let receipt = transport
            .send(&OutboundMessage::sms("+919876543210", "hello"))
            .await
            .unwrap();
        assert!(receipt.message_id.starts_with("demo_fast2sms_"));
    }

    #[test]
    fn test_blank_key_is_demo() {
        let transport = Fast2SmsTransport::new(Fast2SmsConfig {
            api_key: Some(SecureString::from("")),
            ..Default::default()
        })
        .unwrap();
        assert!(transport.is_demo());
    }
}
