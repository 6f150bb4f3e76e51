//! The relay loop: receive, classify, delay, transmit.
//!
//! Single-threaded and run-to-completion per iteration. Each pass records
//! the current time, polls the socket without blocking, enqueues anything
//! that arrived with its per-direction deadline, and transmits the head of
//! the delay queue once its deadline has passed. The only suspension point
//! is a brief sleep when the socket has nothing to read; it affects polling
//! granularity, never correctness.
//!
//! The one deliberate exception to non-blocking operation is the bootstrap
//! step: before the first client datagram arrives there is nothing useful
//! to do, so [`Relay::bootstrap`] blocks, without a timeout, until the
//! client announces itself.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use droja_config::RelayConfig;
use droja_telemetry::RelayMetrics;

use crate::error::RelayError;
use crate::peers::{Direction, PeerRegistry};
use crate::queue::{DelayQueue, MAX_DATAGRAM_SIZE};

/// How long to yield the CPU when a non-blocking receive finds nothing.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The relay engine. Owns the socket, the delay queue, and the peer
/// registry; nothing else touches them.
pub struct Relay {
    socket: UdpSocket,
    queue: DelayQueue,
    peers: PeerRegistry,
    client_to_server_delay: Duration,
    server_to_client_delay: Duration,
    metrics: RelayMetrics,
}

impl Relay {
    /// Binds the listening socket and assembles the engine. The socket
    /// starts out blocking for the bootstrap step; [`Relay::run`] switches
    /// it to non-blocking.
    pub fn bind(config: &RelayConfig, metrics: RelayMetrics) -> Result<Self, RelayError> {
        let socket = UdpSocket::bind(config.listen_addr())?;
        info!(
            listen_port = config.listen_port,
            server_port = config.server_port,
            queue_capacity = config.queue_capacity,
            "relay socket bound"
        );

        Ok(Self {
            socket,
            queue: DelayQueue::with_capacity(config.queue_capacity)?,
            peers: PeerRegistry::new(config.server_addr()),
            client_to_server_delay: config.client_to_server_delay(),
            server_to_client_delay: config.server_to_client_delay(),
            metrics,
        })
    }

    /// The address the relay is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocks until the first datagram arrives, which is by definition from
    /// the client: the server never speaks before it has received anything
    /// to reply to. Captures the sender as the client, queues the datagram
    /// toward the server, and returns the discovered client address.
    pub fn bootstrap(&mut self) -> Result<SocketAddr, RelayError> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let (len, client) = self.socket.recv_from(&mut buf)?;
        let deliver_at = Instant::now() + self.client_to_server_delay;

        self.peers.register_client(client);
        self.queue
            .enqueue(self.peers.server(), deliver_at, &buf[..len])?;
        info!(%client, "client discovered");
        Ok(client)
    }

    /// Runs the relay loop forever. Returns only on a fatal error; normal
    /// operation ends with the process being killed.
    pub fn run(&mut self) -> Result<(), RelayError> {
        self.socket.set_nonblocking(true)?;
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            let now = Instant::now();
            match self.socket.recv_from(&mut buf) {
                Ok((len, sender)) => self.handle_datagram(&buf[..len], sender, now)?,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(RelayError::Io(e)),
            }
            self.flush_due(now)?;
        }
    }

    fn handle_datagram(
        &mut self,
        payload: &[u8],
        sender: SocketAddr,
        now: Instant,
    ) -> Result<(), RelayError> {
        let Some(route) = self.peers.classify(sender) else {
            warn!(%sender, "datagram from unknown sender, dropping");
            self.metrics.stray_datagrams.inc();
            return Ok(());
        };

        let deliver_at = now + self.delay_for(route.direction);
        self.queue.enqueue(route.destination, deliver_at, payload)?;
        self.metrics.queue_depth.set(self.queue.len() as i64);
        trace!(
            %sender,
            destination = %route.destination,
            len = payload.len(),
            "datagram queued"
        );
        Ok(())
    }

    fn flush_due(&mut self, now: Instant) -> Result<(), RelayError> {
        let Some(due) = self.queue.peek_due(now) else {
            return Ok(());
        };
        let destination = due.destination();
        let expected = due.len();

        let written = self.socket.send_to(due.payload(), destination)?;
        if written != expected {
            return Err(RelayError::ShortSend {
                destination,
                written,
                expected,
            });
        }

        self.queue.advance_after_send();
        if destination == self.peers.server() {
            self.metrics.relayed_to_server.inc();
        } else {
            self.metrics.relayed_to_client.inc();
        }
        self.metrics.queue_depth.set(self.queue.len() as i64);
        debug!(%destination, len = expected, "datagram relayed");
        Ok(())
    }

    fn delay_for(&self, direction: Direction) -> Duration {
        match direction {
            Direction::ClientToServer => self.client_to_server_delay,
            Direction::ServerToClient => self.server_to_client_delay,
        }
    }
}
