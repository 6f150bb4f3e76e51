//! Two-endpoint peer registry and direction classification.
//!
//! The relay knows exactly two peers: the server, fixed from configuration,
//! and the client, learned from the first datagram that arrives on the
//! listening socket. Every subsequent datagram is routed purely by comparing
//! its sender address against those two. Senders matching neither peer are
//! reported as unroutable and the caller drops them.

use std::net::SocketAddr;

/// Travel direction of a relayed datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

/// Routing decision for one datagram: where it goes and which per-direction
/// latency applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub destination: SocketAddr,
    pub direction: Direction,
}

/// The two endpoints the relay forwards between.
#[derive(Debug, Clone)]
pub struct PeerRegistry {
    server: SocketAddr,
    client: Option<SocketAddr>,
}

impl PeerRegistry {
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            client: None,
        }
    }

    #[inline]
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    #[inline]
    pub fn client(&self) -> Option<SocketAddr> {
        self.client
    }

    /// Captures the client address from the bootstrap datagram. The first
    /// registration wins; the client is fixed for the process lifetime.
    pub fn register_client(&mut self, addr: SocketAddr) {
        if self.client.is_none() {
            self.client = Some(addr);
        }
    }

    /// Classifies a sender address against the two known peers.
    ///
    /// Compares the full address (IP and port), not just the port, so stray
    /// traffic from unrelated hosts cannot be misrouted. Returns `None` when
    /// the sender matches neither peer or the client is not yet known.
    pub fn classify(&self, sender: SocketAddr) -> Option<Route> {
        if sender == self.server {
            let client = self.client?;
            return Some(Route {
                destination: client,
                direction: Direction::ServerToClient,
            });
        }
        match self.client {
            Some(client) if sender == client => Some(Route {
                destination: self.server,
                direction: Direction::ClientToServer,
            }),
            _ => None,
        }
    }
}
