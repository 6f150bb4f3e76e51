//! Command-line surface of the relay.
//!
//! The positional form mirrors the classic usage
//! `droja <port> <server_port> <ms_to_server> <ms_to_client> [queue_capacity]`;
//! alternatively `--config` loads the same values from a YAML file.

use std::path::PathBuf;

use clap::Parser;
use droja_config::{ConfigError, RelayConfig};

/// Artificial-latency UDP relay for testing client/server protocols.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// UDP port to listen on for client traffic.
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    pub listen_port: Option<u16>,

    /// Loopback port the server is listening on.
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    pub server_port: Option<u16>,

    /// Added delay for client-to-server datagrams, in milliseconds.
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    pub ms_to_server: Option<u64>,

    /// Added delay for server-to-client datagrams, in milliseconds.
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    pub ms_to_client: Option<u64>,

    /// Maximum number of datagrams buffered while their delay elapses.
    #[arg(default_value_t = 256, conflicts_with = "config")]
    pub queue_capacity: usize,

    /// Load the relay configuration from a YAML file instead.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> Result<RelayConfig, ConfigError> {
        if let Some(path) = self.config {
            return RelayConfig::load_from_path(path);
        }

        RelayConfig::from_values(
            self.listen_port.expect("required unless --config is given"),
            self.server_port.expect("required unless --config is given"),
            self.ms_to_server.expect("required unless --config is given"),
            self.ms_to_client.expect("required unless --config is given"),
            self.queue_capacity,
        )
    }
}
