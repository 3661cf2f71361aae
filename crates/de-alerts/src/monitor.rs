//! Periodic threat monitor.
//!
//! Each check pulls the NASA feed for the coming days, runs the threat
//! heuristic over every object and fans alerts out to users inside each
//! danger radius through the email and SMS dispatchers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use de_connectors::{Connector, ConnectorError, NeoFeedConnector};
use de_core::{AsteroidAlert, StoreError, ThreatAssessor, UserRepository};
use metrics::counter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::dispatcher::{AlertDispatcher, DispatchReport};

/// Default time between checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(600);

/// Errors that abort a single check.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("NEO feed unavailable: {0}")]
    Feed(#[from] ConnectorError),

    #[error("User store error: {0}")]
    Store(#[from] StoreError),
}

/// Monitor settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    /// Days after today included in each feed request.
    pub lookahead_days: u32,
    pub assessor: ThreatAssessor,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CHECK_INTERVAL,
            lookahead_days: 1,
            assessor: ThreatAssessor::default(),
        }
    }
}

/// Result of one threat check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatCheckReport {
    pub checked_at: DateTime<Utc>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub objects_checked: usize,
    pub threats: Vec<AsteroidAlert>,
    pub email: DispatchReport,
    pub sms: DispatchReport,
}

impl ThreatCheckReport {
    pub fn alerts_sent(&self) -> usize {
        self.email.sent + self.sms.sent
    }
}

fn log_check_outcome(result: Result<ThreatCheckReport, MonitorError>) {
    match result {
        Ok(report) => {
            info!(
                objects = report.objects_checked,
                threats = report.threats.len(),
                alerts_sent = report.alerts_sent(),
                "Threat check complete"
            );
        }
        Err(MonitorError::Feed(e)) => {
            warn!(error = %e, "Threat check skipped, feed unavailable");
        }
        Err(e) => {
            error!(error = %e, "Threat check failed");
        }
    }
}

/// Runs threat checks on demand and on a fixed interval.
pub struct AlertMonitor {
    neo: Arc<dyn NeoFeedConnector>,
    users: Arc<dyn UserRepository>,
    email: AlertDispatcher,
    sms: AlertDispatcher,
    config: MonitorConfig,
    rng: Mutex<StdRng>,
    last_report: RwLock<Option<ThreatCheckReport>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl AlertMonitor {
    pub fn new(
        neo: Arc<dyn NeoFeedConnector>,
        users: Arc<dyn UserRepository>,
        email: AlertDispatcher,
        sms: AlertDispatcher,
        config: MonitorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            neo,
            users,
            email,
            sms,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
            last_report: RwLock::new(None),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Replaces the random source, making checks reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The most recent completed check, if any.
    pub async fn last_report(&self) -> Option<ThreatCheckReport> {
        self.last_report.read().await.clone()
    }

    /// Runs one check over today through today plus the lookahead.
    pub async fn run_check(&self) -> Result<ThreatCheckReport, MonitorError> {
        let start = Utc::now().date_naive();
        let end = start + ChronoDuration::days(i64::from(self.config.lookahead_days));
        self.run_check_for(start, end).await
    }

    /// Runs one check over an explicit date window.
    #[instrument(skip(self))]
    pub async fn run_check_for(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ThreatCheckReport, MonitorError> {
        let feed = match self.neo.feed(start, end).await {
            Ok(feed) => feed,
            Err(e) => {
                counter!("de_threat_checks_total", "outcome" => "error").increment(1);
                return Err(e.into());
            }
        };

        let threats = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            self.config.assessor.evaluate(&feed.objects, &mut *rng)
        };

        info!(
            objects = feed.objects.len(),
            threats = threats.len(),
            "Evaluated NEO feed"
        );

        let mut email = DispatchReport::empty(self.email.channel(), self.email.transport().name());
        let mut sms = DispatchReport::empty(self.sms.channel(), self.sms.transport().name());

        for alert in &threats {
            let nearby = self
                .users
                .find_within(&alert.impact, alert.danger_radius_km)
                .await?;
            if nearby.is_empty() {
                debug!(alert = %alert.name, "No registered users in danger radius");
                continue;
            }
            email.merge(self.email.dispatch(alert, &nearby).await);
            sms.merge(self.sms.dispatch(alert, &nearby).await);
        }

        counter!("de_threat_checks_total", "outcome" => "ok").increment(1);

        let report = ThreatCheckReport {
            checked_at: Utc::now(),
            window_start: start,
            window_end: end,
            objects_checked: feed.objects.len(),
            threats,
            email,
            sms,
        };
        *self.last_report.write().await = Some(report.clone());
        Ok(report)
    }

    /// Spawns the periodic check loop. The first check runs immediately.
    pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let monitor = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor.config.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            info!(
                interval_secs = monitor.config.interval.as_secs(),
                lookahead_days = monitor.config.lookahead_days,
                "Starting threat monitor"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // Shutdown preempts an in-flight check.
                        tokio::select! {
                            result = monitor.run_check() => log_check_outcome(result),
                            _ = shutdown_rx.changed() => {
                                info!("Threat monitor shutting down, abandoning in-flight check");
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Threat monitor shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Signals the check loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
