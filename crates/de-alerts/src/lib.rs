//! # de-alerts
//!
//! Turns threat assessments into notifications.
//!
//! [`templates`] renders welcome, impact and test messages, [`dispatcher`]
//! fans a message out to every in-range user over one transport, and
//! [`monitor`] runs the periodic NASA feed check that drives both.

pub mod dispatcher;
pub mod monitor;
pub mod templates;

pub use dispatcher::{AlertDispatcher, DeliveryFailure, DispatchMode, DispatchReport};
pub use monitor::{AlertMonitor, MonitorConfig, MonitorError, ThreatCheckReport};
