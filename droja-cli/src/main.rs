//! ## droja-cli
//! **Operator entrypoint for the droja latency relay**
//!
//! Parses the command-line surface, installs the tracing subscriber, and
//! hands the validated configuration to the relay engine. After the
//! bootstrap step it prints the one status line operators rely on — the
//! discovered client port — and then relays until killed or until the
//! engine hits a fatal error.

use clap::Parser;
use droja_core::Relay;
use droja_telemetry::logging::EventLogger;
use droja_telemetry::metrics::RelayMetrics;

mod args;

use args::Cli;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();

    let cli = Cli::parse();
    let config = cli.into_config()?;

    let mut relay = Relay::bind(&config, RelayMetrics::new())?;
    let client = relay.bootstrap()?;
    println!("client port: {}", client.port());

    relay.run()?;
    Ok(())
}
