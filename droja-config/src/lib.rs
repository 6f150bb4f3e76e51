//! # droja configuration
//!
//! Typed, validated configuration for the relay. Values normally arrive as
//! plain command-line arguments and are checked through
//! [`RelayConfig::from_values`]; a YAML file merged with `DROJA_*`
//! environment overrides is supported through
//! [`RelayConfig::load_from_path`].

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;

pub use error::ConfigError;

fn default_queue_capacity() -> usize {
    256
}

/// Relay configuration: where to listen, where the server lives, and how
/// much latency to add in each direction.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RelayConfig {
    /// UDP port the relay listens on for client traffic.
    #[validate(range(min = 1))]
    pub listen_port: u16,

    /// Loopback port the server is reachable at.
    #[validate(range(min = 1))]
    pub server_port: u16,

    /// Added delay for client-to-server datagrams, in milliseconds.
    /// Zero is valid and means pass-through.
    pub ms_to_server: u64,

    /// Added delay for server-to-client datagrams, in milliseconds.
    pub ms_to_client: u64,

    /// Hard upper bound on datagrams buffered while their delay elapses.
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, max = 1_048_576))]
    pub queue_capacity: usize,
}

impl RelayConfig {
    /// Builds and validates a configuration from already-parsed values.
    pub fn from_values(
        listen_port: u16,
        server_port: u16,
        ms_to_server: u64,
        ms_to_client: u64,
        queue_capacity: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            listen_port,
            server_port,
            ms_to_server,
            ms_to_client,
            queue_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a YAML file, with `DROJA_*` environment
    /// variables taking precedence over file values.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("DROJA_"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Wildcard listening address for the relay socket.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.listen_port))
    }

    /// The server endpoint, assumed reachable over loopback.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.server_port))
    }

    pub fn client_to_server_delay(&self) -> Duration {
        Duration::from_millis(self.ms_to_server)
    }

    pub fn server_to_client_delay(&self) -> Duration {
        Duration::from_millis(self.ms_to_client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_delays() {
        let config = RelayConfig::from_values(4000, 5000, 0, 0, 256).unwrap();
        assert_eq!(config.client_to_server_delay(), Duration::ZERO);
        assert_eq!(config.server_to_client_delay(), Duration::ZERO);
    }

    #[test]
    fn rejects_zero_ports() {
        assert!(matches!(
            RelayConfig::from_values(0, 5000, 100, 50, 256),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            RelayConfig::from_values(4000, 0, 100, 50, 256),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_queue_capacity() {
        assert!(matches!(
            RelayConfig::from_values(4000, 5000, 100, 50, 0),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn derives_addresses_and_delays() {
        let config = RelayConfig::from_values(4000, 5000, 100, 50, 256).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:4000".parse().unwrap());
        assert_eq!(config.server_addr(), "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.client_to_server_delay(), Duration::from_millis(100));
        assert_eq!(config.server_to_client_delay(), Duration::from_millis(50));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            RelayConfig::load_from_path("/nonexistent/droja.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn loads_yaml_with_defaulted_capacity() {
        let path = std::env::temp_dir().join("droja-config-load-test.yaml");
        std::fs::write(
            &path,
            "listen_port: 4000\nserver_port: 5000\nms_to_server: 100\nms_to_client: 50\n",
        )
        .unwrap();

        let config = RelayConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.listen_port, 4000);
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.queue_capacity, 256);
    }
}
