//! # droja-core
//!
//! Relay engine for droja, an artificial-latency UDP relay.
//! Sits between a single client and a single server and forwards datagrams
//! in both directions, holding each one for a configurable, per-direction
//! delay before passing it on.
//!
//! ### Expectations:
//! - Bounded memory: all buffering happens in a fixed-capacity ring
//! - Zero heap allocations per relayed datagram
//! - Single-threaded; no locks anywhere in the datagram path
//!
//! ### Key Submodules:
//! - `queue`: fixed-capacity delay queue with positional slot ownership
//! - `peers`: two-endpoint registry and direction classification
//! - `relay`: the receive/classify/delay/transmit loop

pub mod error;
pub mod peers;
pub mod queue;
pub mod relay;

pub use error::RelayError;
pub use peers::{Direction, PeerRegistry, Route};
pub use queue::{DelayQueue, QueueError, MAX_DATAGRAM_SIZE};
pub use relay::Relay;
