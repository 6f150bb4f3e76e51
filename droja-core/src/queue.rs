//! Fixed-capacity delay queue for datagrams awaiting transmission.
//!
//! A ring of preallocated packet slots reused via wraparound cursor
//! arithmetic. A packet exists only between being written at the receive
//! cursor and being read at the send cursor; slots are overwritten in
//! place, so ownership is positional and no allocation happens per packet.
//!
//! Because every packet entering the queue gets a deadline of
//! `receive time + direction latency` with a fixed latency per direction,
//! FIFO order is also earliest-deadline-first order. A plain ring is
//! therefore sufficient; per-packet variable delay would need a priority
//! structure instead.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Instant;

use thiserror::Error;

/// Largest datagram the relay will accept or forward, in bytes.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Delay queue error conditions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    /// The queue already holds `capacity` undelivered packets. Fatal by
    /// contract: silently dropping here would make the relay lie about
    /// network behavior.
    #[error("delay queue capacity exceeded")]
    CapacityExceeded,
    #[error("invalid capacity (must hold at least one packet)")]
    InvalidCapacity,
    #[error("payload of {len} bytes exceeds the {MAX_DATAGRAM_SIZE} byte datagram limit")]
    OversizedPayload { len: usize },
}

/// One buffered datagram awaiting delayed delivery.
#[derive(Debug)]
pub struct PacketSlot {
    deliver_at: Instant,
    destination: SocketAddr,
    len: usize,
    payload: [u8; MAX_DATAGRAM_SIZE],
}

impl PacketSlot {
    fn vacant() -> Self {
        Self {
            deliver_at: Instant::now(),
            destination: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            len: 0,
            payload: [0; MAX_DATAGRAM_SIZE],
        }
    }

    /// The received bytes, exactly as they arrived.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }

    #[inline]
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Time after which this packet is eligible for transmission.
    #[inline]
    pub fn deliver_at(&self) -> Instant {
        self.deliver_at
    }
}

/// Time-ordered delivery queue over a fixed ring of packet slots.
///
/// `recv_cursor` is the next slot to fill; `send_cursor` is the next slot
/// eligible for transmission, or `None` when nothing is pending. The queue
/// is full when the receive cursor has caught back up to the send cursor.
#[derive(Debug)]
pub struct DelayQueue {
    slots: Box<[PacketSlot]>,
    recv_cursor: usize,
    send_cursor: Option<usize>,
}

impl DelayQueue {
    /// Creates a queue holding up to `capacity` undelivered packets.
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }

        let slots = (0..capacity)
            .map(|_| PacketSlot::vacant())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            slots,
            recv_cursor: 0,
            send_cursor: None,
        })
    }

    /// Writes a datagram into the slot at the receive cursor.
    ///
    /// Fails with [`QueueError::CapacityExceeded`] when the queue already
    /// holds `capacity` unsent packets; the caller must treat that as fatal.
    pub fn enqueue(
        &mut self,
        destination: SocketAddr,
        deliver_at: Instant,
        payload: &[u8],
    ) -> Result<(), QueueError> {
        if self.send_cursor == Some(self.recv_cursor) {
            return Err(QueueError::CapacityExceeded);
        }
        if payload.len() > MAX_DATAGRAM_SIZE {
            return Err(QueueError::OversizedPayload { len: payload.len() });
        }

        let slot = &mut self.slots[self.recv_cursor];
        slot.payload[..payload.len()].copy_from_slice(payload);
        slot.len = payload.len();
        slot.destination = destination;
        slot.deliver_at = deliver_at;

        if self.send_cursor.is_none() {
            self.send_cursor = Some(self.recv_cursor);
        }
        self.recv_cursor = (self.recv_cursor + 1) % self.slots.len();
        Ok(())
    }

    /// Returns the packet at the send cursor if one is pending and its
    /// deadline has passed.
    pub fn peek_due(&self, now: Instant) -> Option<&PacketSlot> {
        let cursor = self.send_cursor?;
        let slot = &self.slots[cursor];
        if now >= slot.deliver_at {
            Some(slot)
        } else {
            None
        }
    }

    /// Advances the send cursor past a transmitted packet, collapsing to
    /// the empty sentinel when it reaches the receive cursor.
    pub fn advance_after_send(&mut self) {
        let Some(cursor) = self.send_cursor else {
            return;
        };
        let next = (cursor + 1) % self.slots.len();
        self.send_cursor = if next == self.recv_cursor {
            None
        } else {
            Some(next)
        };
    }

    /// Number of undelivered packets currently held.
    pub fn len(&self) -> usize {
        match self.send_cursor {
            None => 0,
            Some(send) if send < self.recv_cursor => self.recv_cursor - send,
            Some(send) if send > self.recv_cursor => self.slots.len() - send + self.recv_cursor,
            Some(_) => self.slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.send_cursor.is_none()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dest() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(
            DelayQueue::with_capacity(0).unwrap_err(),
            QueueError::InvalidCapacity
        );
    }

    #[test]
    fn rejects_oversized_payload() {
        let mut queue = DelayQueue::with_capacity(4).unwrap();
        let payload = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        assert_eq!(
            queue.enqueue(dest(), Instant::now(), &payload).unwrap_err(),
            QueueError::OversizedPayload {
                len: MAX_DATAGRAM_SIZE + 1
            }
        );
    }

    #[test]
    fn maintains_fifo_order() {
        let mut queue = DelayQueue::with_capacity(4).unwrap();
        let now = Instant::now();
        queue.enqueue(dest(), now, b"first").unwrap();
        queue.enqueue(dest(), now, b"second").unwrap();

        assert_eq!(queue.peek_due(now).unwrap().payload(), b"first");
        queue.advance_after_send();
        assert_eq!(queue.peek_due(now).unwrap().payload(), b"second");
        queue.advance_after_send();
        assert!(queue.peek_due(now).is_none());
    }

    #[test]
    fn holds_packets_until_due() {
        let mut queue = DelayQueue::with_capacity(2).unwrap();
        let now = Instant::now();
        let deadline = now + Duration::from_millis(100);
        queue.enqueue(dest(), deadline, b"delayed").unwrap();

        assert!(queue.peek_due(now).is_none());
        assert!(queue.peek_due(deadline).is_some());
        assert!(queue
            .peek_due(deadline + Duration::from_millis(1))
            .is_some());
    }

    #[test]
    fn signals_capacity_exceeded() {
        let mut queue = DelayQueue::with_capacity(2).unwrap();
        let later = Instant::now() + Duration::from_secs(60);
        queue.enqueue(dest(), later, b"one").unwrap();
        queue.enqueue(dest(), later, b"two").unwrap();
        assert_eq!(
            queue.enqueue(dest(), later, b"three").unwrap_err(),
            QueueError::CapacityExceeded
        );
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drains_to_empty_sentinel_and_refills() {
        let mut queue = DelayQueue::with_capacity(2).unwrap();
        let now = Instant::now();
        queue.enqueue(dest(), now, b"only").unwrap();
        queue.advance_after_send();

        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.peek_due(now).is_none());

        queue.enqueue(dest(), now, b"again").unwrap();
        assert_eq!(queue.peek_due(now).unwrap().payload(), b"again");
    }

    #[test]
    fn wraps_ring_correctly() {
        let mut queue = DelayQueue::with_capacity(4).unwrap();
        let now = Instant::now();
        for cycle in 0u8..3 {
            for i in 0u8..4 {
                queue.enqueue(dest(), now, &[cycle, i]).unwrap();
            }
            assert_eq!(queue.len(), 4);
            for i in 0u8..4 {
                assert_eq!(queue.peek_due(now).unwrap().payload(), &[cycle, i]);
                queue.advance_after_send();
            }
            assert!(queue.is_empty());
        }
    }

    #[test]
    fn interleaved_enqueue_and_drain_keeps_order() {
        let mut queue = DelayQueue::with_capacity(3).unwrap();
        let now = Instant::now();
        queue.enqueue(dest(), now, b"a").unwrap();
        queue.enqueue(dest(), now, b"b").unwrap();

        assert_eq!(queue.peek_due(now).unwrap().payload(), b"a");
        queue.advance_after_send();

        queue.enqueue(dest(), now, b"c").unwrap();
        queue.enqueue(dest(), now, b"d").unwrap();
        assert_eq!(
            queue.enqueue(dest(), now, b"e").unwrap_err(),
            QueueError::CapacityExceeded
        );

        for expected in [b"b", b"c", b"d"] {
            assert_eq!(queue.peek_due(now).unwrap().payload(), expected);
            queue.advance_after_send();
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn preserves_destination_and_length() {
        let mut queue = DelayQueue::with_capacity(2).unwrap();
        let now = Instant::now();
        let other: SocketAddr = "10.1.2.3:4567".parse().unwrap();
        queue.enqueue(other, now, &[0xAB; 1500]).unwrap();

        let slot = queue.peek_due(now).unwrap();
        assert_eq!(slot.destination(), other);
        assert_eq!(slot.len(), 1500);
        assert_eq!(slot.payload(), &[0xAB; 1500][..]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn replays_payloads_in_arrival_order(
                payloads in prop::collection::vec(
                    prop::collection::vec(any::<u8>(), 0..64),
                    1..32,
                )
            ) {
                let mut queue = DelayQueue::with_capacity(32).unwrap();
                let now = Instant::now();
                for payload in &payloads {
                    queue.enqueue(dest(), now, payload).unwrap();
                }
                for payload in &payloads {
                    let slot = queue.peek_due(now).unwrap();
                    prop_assert_eq!(slot.payload(), &payload[..]);
                    queue.advance_after_send();
                }
                prop_assert!(queue.is_empty());
            }

            #[test]
            fn overflow_is_always_detected(capacity in 1usize..16) {
                let mut queue = DelayQueue::with_capacity(capacity).unwrap();
                let later = Instant::now() + std::time::Duration::from_secs(60);
                for _ in 0..capacity {
                    queue.enqueue(dest(), later, b"fill").unwrap();
                }
                prop_assert_eq!(
                    queue.enqueue(dest(), later, b"overflow").unwrap_err(),
                    QueueError::CapacityExceeded
                );
                prop_assert_eq!(queue.len(), capacity);
            }
        }
    }
}
