//! Error types for the relay engine.

use std::net::SocketAddr;

use thiserror::Error;

use crate::queue::QueueError;

/// Fatal relay conditions. Every variant aborts the process: this is a
/// test-support tool, and accurately simulating delay matters more than
/// uptime.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The delay queue overflowed. The configured capacity is too small for
    /// the chosen latencies and traffic rate.
    #[error("delay queue error: {0}")]
    Queue(#[from] QueueError),

    /// A UDP send wrote fewer bytes than the datagram holds. Datagram sends
    /// are atomic, so a mismatch means a socket-layer fault below us.
    #[error("short send to {destination}: wrote {written} of {expected} bytes")]
    ShortSend {
        destination: SocketAddr,
        written: usize,
        expected: usize,
    },

    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}
