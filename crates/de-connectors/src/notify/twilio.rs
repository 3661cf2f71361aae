//! Twilio Programmable Messaging transport.

use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    AuthConfig, Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    DeliveryReceipt, NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use de_core::Channel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const PROVIDER: &str = "twilio";

fn default_base_url() -> String {
    "https://api.twilio.com".to_string()
}

/// Twilio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub auth_token: Option<SecureString>,
    /// Sender number in E.164 format.
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: None,
            base_url: default_base_url(),
        }
    }
}

impl TwilioConfig {
    pub fn is_configured(&self) -> bool {
        self.account_sid.as_deref().is_some_and(|s| !s.is_empty())
            && self.auth_token.as_ref().is_some_and(|t| !t.is_empty())
            && self.from_number.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// SMS transport backed by the Twilio REST API.
pub struct TwilioTransport {
    config: TwilioConfig,
    client: Option<HttpClient>,
}

impl TwilioTransport {
    pub fn new(config: TwilioConfig) -> ConnectorResult<Self> {
        if !config.is_configured() {
            warn!("Twilio credentials not configured, SMS sends will be simulated");
            return Ok(Self {
                config,
                client: None,
            });
        }

        let auth = AuthConfig::Basic {
            username: config.account_sid.clone().unwrap_or_default(),
            password: config.auth_token.clone().unwrap_or_default(),
        };
        let client =
            HttpClient::new(ConnectorConfig::new(PROVIDER, &config.base_url).with_auth(auth))?;

        Ok(Self {
            config,
            client: Some(client),
        })
    }

    fn account_path(&self, suffix: &str) -> String {
        format!(
            "/2010-04-01/Accounts/{}/{}",
            self.config.account_sid.as_deref().unwrap_or_default(),
            suffix
        )
    }
}

#[async_trait]
impl Connector for TwilioTransport {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn connector_type(&self) -> &str {
        "sms"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        let Some(client) = &self.client else {
            return Ok(ConnectorHealth::Degraded("demo mode".to_string()));
        };
        match client
            .get(&self.account_path("Balance.json"), &[] as &[(&str, &str)])
            .await
        {
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(ConnectorError::AuthenticationFailed(e)) => Ok(ConnectorHealth::Unhealthy(e)),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(matches!(self.health_check().await?, ConnectorHealth::Healthy))
    }
}

#[async_trait]
impl NotificationTransport for TwilioTransport {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        let Some(client) = &self.client else {
            info!(recipient = %message.recipient, "Simulating Twilio send");
            return Ok(DeliveryReceipt::demo(PROVIDER));
        };

        let from = self.config.from_number.as_deref().unwrap_or_default();
        let form = [
            ("To", message.recipient.as_str()),
            ("From", from),
            ("Body", message.body.as_str()),
        ];

        let response: TwilioMessageResponse = client
            .post_form(&self.account_path("Messages.json"), &form)
            .await?;

        info!(
            recipient = %message.recipient,
            sid = %response.sid,
            status = response.status.as_deref().unwrap_or("unknown"),
            "SMS sent via Twilio"
        );
        Ok(DeliveryReceipt::delivered(PROVIDER, response.sid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> TwilioConfig {
        TwilioConfig {
            account_sid: Some("AC0123456789abcdef0123456789abcdef".to_string()),
            auth_token: Some(SecureString::from("token")),
            from_number: Some("+15005550006".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_configured_requires_all_fields() {
        assert!(configured().is_configured());
        assert!(!TwilioConfig {
            from_number: None,
            ..configured()
        }
        .is_configured());
        assert!(!TwilioConfig::default().is_configured());
    }

    #[test]
    fn test_messages_path() {
        let transport = TwilioTransport::new(configured()).unwrap();
        assert!(!transport.is_demo());
        assert_eq!(
            transport.account_path("Messages.json"),
            "/2010-04-01/Accounts/AC0123456789abcdef0123456789abcdef/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_demo_send() {
        let transport = TwilioTransport::new(TwilioConfig::default()).unwrap();
        let receipt = transport
            .send(&OutboundMessage::sms("+14155552671", "test"))
            .await
            .unwrap();
        assert!(receipt.demo);
        assert!(receipt.message_id.starts_with("demo_twilio_"));
    }

    #[test]
    fn test_parse_message_response() {
        let json = r#"{"sid":"SM123","status":"queued","to":"+14155552671"}"#;
        let parsed: TwilioMessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.sid, "SM123");
        assert_eq!(parsed.status.as_deref(), Some("queued"));
    }
}
