//! Alert fan-out over a single notification transport.
//!
//! Recipients are the users whose contact matches the transport's channel and
//! whose location lies inside the alert's danger radius. Sends are never
//! retried; each failure is logged and recorded in the [`DispatchReport`].

use std::sync::Arc;
use std::time::Duration;

use de_connectors::{Connector, NotificationTransport, OutboundMessage};
use de_core::{AsteroidAlert, Channel, User};
use futures::future::join_all;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::templates;

/// Default pause between sends or batches.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(2);

/// Default number of concurrent sends per SMS batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// How a dispatcher paces its sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One send at a time with `delay` between sends.
    Sequential { delay: Duration },
    /// `batch_size` concurrent sends, `delay` between batches.
    Batched { batch_size: usize, delay: Duration },
}

impl DispatchMode {
    /// Sequential for email, batches of ten for SMS.
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Email => DispatchMode::Sequential {
                delay: DEFAULT_SEND_DELAY,
            },
            Channel::Sms => DispatchMode::Batched {
                batch_size: DEFAULT_BATCH_SIZE,
                delay: DEFAULT_SEND_DELAY,
            },
        }
    }

    fn batch_size(&self) -> usize {
        match self {
            DispatchMode::Sequential { .. } => 1,
            DispatchMode::Batched { batch_size, .. } => (*batch_size).max(1),
        }
    }

    fn delay(&self) -> Duration {
        match self {
            DispatchMode::Sequential { delay } | DispatchMode::Batched { delay, .. } => *delay,
        }
    }
}

/// One failed send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    /// Masked recipient address.
    pub recipient: String,
    pub error: String,
}

/// Outcome of a fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub channel: Channel,
    pub provider: String,
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    /// Sends that were simulated because the provider has no credentials.
    pub demo: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn empty(channel: Channel, provider: impl Into<String>) -> Self {
        Self {
            channel,
            provider: provider.into(),
            attempted: 0,
            sent: 0,
            failed: 0,
            demo: 0,
            failures: Vec::new(),
        }
    }

    /// Adds the counts of `other` to this report.
    pub fn merge(&mut self, other: DispatchReport) {
        self.attempted += other.attempted;
        self.sent += other.sent;
        self.failed += other.failed;
        self.demo += other.demo;
        self.failures.extend(other.failures);
    }
}

struct Envelope {
    masked_recipient: String,
    message: OutboundMessage,
}

/// Sends alerts to in-range users through one transport.
#[derive(Clone)]
pub struct AlertDispatcher {
    transport: Arc<dyn NotificationTransport>,
    mode: DispatchMode,
}

impl AlertDispatcher {
    /// Creates a dispatcher using the default pacing for the transport's channel.
    pub fn new(transport: Arc<dyn NotificationTransport>) -> Self {
        let mode = DispatchMode::for_channel(transport.channel());
        Self { transport, mode }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn channel(&self) -> Channel {
        self.transport.channel()
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn transport(&self) -> &Arc<dyn NotificationTransport> {
        &self.transport
    }

    /// Users this dispatcher would notify for `alert`.
    pub fn recipients<'a>(&self, alert: &AsteroidAlert, users: &'a [User]) -> Vec<&'a User> {
        let channel = self.channel();
        users
            .iter()
            .filter(|u| u.channel() == channel && alert.endangers(&u.location))
            .collect()
    }

    /// Sends the impact alert to every in-range user on this channel.
    #[instrument(skip(self, alert, users), fields(alert = %alert.name, provider = %self.transport.name()))]
    pub async fn dispatch(&self, alert: &AsteroidAlert, users: &[User]) -> DispatchReport {
        let envelopes: Vec<Envelope> = self
            .recipients(alert, users)
            .into_iter()
            .map(|user| Envelope {
                masked_recipient: user.contact.masked(),
                message: templates::impact_alert(alert, user),
            })
            .collect();

        info!(
            recipients = envelopes.len(),
            threat_level = %alert.threat_level,
            "Dispatching impact alert"
        );
        self.deliver(envelopes).await
    }

    async fn deliver(&self, envelopes: Vec<Envelope>) -> DispatchReport {
        let mut report = DispatchReport::empty(self.channel(), self.transport.name());
        let batch_size = self.mode.batch_size();
        let delay = self.mode.delay();

        let mut chunks = envelopes.chunks(batch_size).peekable();
        while let Some(chunk) = chunks.next() {
            // All-settled: every send in the batch runs to completion.
            let results = join_all(chunk.iter().map(|e| self.transport.send(&e.message))).await;

            for (envelope, result) in chunk.iter().zip(results) {
                report.attempted += 1;
                match result {
                    Ok(receipt) => {
                        report.sent += 1;
                        if receipt.demo {
                            report.demo += 1;
                        }
                        debug!(
                            recipient = %envelope.masked_recipient,
                            message_id = %receipt.message_id,
                            "Alert delivered"
                        );
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            recipient = %envelope.masked_recipient,
                            error = %e,
                            "Alert delivery failed"
                        );
                        report.failures.push(DeliveryFailure {
                            recipient: envelope.masked_recipient.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }

            if chunks.peek().is_some() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let channel = self.channel().to_string();
        let provider = self.transport.name().to_string();
        counter!(
            "de_alerts_sent_total",
            "channel" => channel.clone(),
            "provider" => provider.clone()
        )
        .increment(report.sent as u64);
        counter!(
            "de_alerts_failed_total",
            "channel" => channel,
            "provider" => provider
        )
        .increment(report.failed as u64);

        info!(
            attempted = report.attempted,
            sent = report.sent,
            failed = report.failed,
            demo = report.demo,
            "Dispatch complete"
        );
        report
    }
}
