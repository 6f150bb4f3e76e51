//! # droja telemetry
//!
//! Logging and metrics for the relay: a tracing subscriber setup and a
//! small set of Prometheus counters describing relay activity.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::RelayMetrics;
