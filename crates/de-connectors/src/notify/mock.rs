//! Mock notification transport for testing.
//!
//! Records every message without making network calls. Can fail all sends
//! or only sends to specific recipients.

use crate::traits::{
    Connector, ConnectorError, ConnectorHealth, ConnectorResult, DeliveryReceipt,
    NotificationTransport, OutboundMessage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use de_core::Channel;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A message accepted by the mock transport.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    pub message: OutboundMessage,
    pub timestamp: DateTime<Utc>,
}

/// Mock transport for testing alert delivery.
#[derive(Clone)]
pub struct MockTransport {
    name: String,
    channel: Channel,
    demo: bool,
    messages: Arc<RwLock<Vec<RecordedMessage>>>,
    should_fail: Arc<RwLock<bool>>,
    failing_recipients: Arc<RwLock<HashSet<String>>>,
}

impl MockTransport {
    pub fn new(name: &str, channel: Channel) -> Self {
        Self {
            name: name.to_string(),
            channel,
            demo: false,
            messages: Arc::new(RwLock::new(Vec::new())),
            should_fail: Arc::new(RwLock::new(false)),
            failing_recipients: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn email() -> Self {
        Self::new("mock-email", Channel::Email)
    }

    pub fn sms() -> Self {
        Self::new("mock-sms", Channel::Sms)
    }

    /// Reports itself as a demo transport.
    pub fn as_demo(mut self) -> Self {
        self.demo = true;
        self
    }

    /// Sets whether every send should fail.
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Makes sends to `recipient` fail.
    pub async fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .write()
            .await
            .insert(recipient.to_string());
    }

    pub async fn get_messages(&self) -> Vec<RecordedMessage> {
        self.messages.read().await.clone()
    }

    /// Recipients in send order.
    pub async fn recipients(&self) -> Vec<String> {
        self.messages
            .read()
            .await
            .iter()
            .map(|m| m.message.recipient.clone())
            .collect()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}

#[async_trait]
impl Connector for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> &str {
        match self.channel {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        if *self.should_fail.read().await {
            Ok(ConnectorHealth::Unhealthy("Mock failure mode".to_string()))
        } else {
            Ok(ConnectorHealth::Healthy)
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(!*self.should_fail.read().await)
    }
}

#[async_trait]
impl NotificationTransport for MockTransport {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn is_demo(&self) -> bool {
        self.demo
    }

    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt> {
        if *self.should_fail.read().await
            || self
                .failing_recipients
                .read()
                .await
                .contains(&message.recipient)
        {
            return Err(ConnectorError::RequestFailed("Mock failure".to_string()));
        }

        self.messages.write().await.push(RecordedMessage {
            message: message.clone(),
            timestamp: Utc::now(),
        });

        if self.demo {
            Ok(DeliveryReceipt::demo(&self.name))
        } else {
            Ok(DeliveryReceipt::delivered(
                self.name.clone(),
                uuid::Uuid::new_v4().to_string(),
            ))
        }
    }
}
