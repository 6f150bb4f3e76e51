//! Structured logging setup built on `tracing`.
//!
//! Verbosity defaults to `info` and is overridden through `RUST_LOG`.
//! Per-datagram events sit at `debug` and `trace` so steady-state output
//! stays quiet.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global tracing subscriber. Call once at startup before
    /// any logging occurs.
    pub fn init() {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init()
    }
}
