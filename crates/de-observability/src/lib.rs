//! # de-observability
//!
//! Structured logging with tracing and Prometheus metrics for DefendEarth.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
pub use metrics::{install_prometheus_recorder, register_metrics, MetricsError};
