//! Prometheus metrics for the relay loop.

use prometheus::{IntCounter, IntGauge, Registry};

/// Counters and gauges describing relay activity. Cheap to clone; all
/// handles share the same underlying registry.
#[derive(Debug, Clone)]
pub struct RelayMetrics {
    pub registry: Registry,
    pub relayed_to_server: IntCounter,
    pub relayed_to_client: IntCounter,
    pub stray_datagrams: IntCounter,
    pub queue_depth: IntGauge,
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let relayed_to_server = IntCounter::new(
            "droja_relayed_to_server_total",
            "Datagrams delivered to the server after their delay",
        )
        .unwrap();
        let relayed_to_client = IntCounter::new(
            "droja_relayed_to_client_total",
            "Datagrams delivered to the client after their delay",
        )
        .unwrap();
        let stray_datagrams = IntCounter::new(
            "droja_stray_datagrams_total",
            "Datagrams dropped because the sender matched neither peer",
        )
        .unwrap();
        let queue_depth = IntGauge::new(
            "droja_queue_depth",
            "Datagrams currently buffered in the delay queue",
        )
        .unwrap();

        registry
            .register(Box::new(relayed_to_server.clone()))
            .unwrap();
        registry
            .register(Box::new(relayed_to_client.clone()))
            .unwrap();
        registry.register(Box::new(stray_datagrams.clone())).unwrap();
        registry.register(Box::new(queue_depth.clone())).unwrap();

        Self {
            registry,
            relayed_to_server,
            relayed_to_client,
            stray_datagrams,
            queue_depth,
        }
    }

    /// Renders all registered metrics in the Prometheus text format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathers_registered_counters() {
        let metrics = RelayMetrics::new();
        metrics.relayed_to_server.inc();
        metrics.queue_depth.set(3);

        let rendered = metrics.gather_metrics().unwrap();
        assert!(rendered.contains("droja_relayed_to_server_total 1"));
        assert!(rendered.contains("droja_queue_depth 3"));
    }
}
