// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory event bus: one FIFO, one subscriber, explicit acks.
//!
//! Delivery is at-least-once from the consumer's point of view; ordering
//! across events is not promised. A production deployment may substitute
//! a stream-backed bus behind the same surface.

use fm_core::{EventEnvelope, GovernorEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("bus is closed")]
    Closed,
    #[error("bus already has a subscriber")]
    AlreadySubscribed,
}

struct BusInner {
    tx: mpsc::UnboundedSender<EventEnvelope>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<EventEnvelope>>>,
    pending_acks: Mutex<HashSet<u64>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Single logical FIFO of event envelopes.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(BusInner {
                tx,
                rx: Mutex::new(Some(rx)),
                pending_acks: Mutex::new(HashSet::new()),
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue an event. Fails only when the bus is closed.
    pub fn publish(&self, event: GovernorEvent) -> Result<u64, BusError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.pending_acks.lock().insert(id);
        let envelope = EventEnvelope { id, event, ack_pending: true };
        if self.inner.tx.send(envelope).is_err() {
            self.inner.pending_acks.lock().remove(&id);
            return Err(BusError::Closed);
        }
        Ok(id)
    }

    /// Take the single subscription. The second call fails.
    pub fn subscribe(&self) -> Result<EventStream, BusError> {
        let rx = self.inner.rx.lock().take().ok_or(BusError::AlreadySubscribed)?;
        Ok(EventStream { rx, bus: Arc::clone(&self.inner) })
    }

    /// Consumer acknowledgment; required after every envelope, no-ops
    /// included. Returns false for unknown or repeated ids.
    pub fn ack(&self, id: u64) -> bool {
        self.inner.pending_acks.lock().remove(&id)
    }

    /// Envelopes published but not yet acked.
    pub fn pending_ack_count(&self) -> usize {
        self.inner.pending_acks.lock().len()
    }

    /// Terminate the subscriber; further publishes fail.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        // Dropping the receiver half is observed by the stream as end.
        // The sender side stays alive; publish() checks `closed` first.
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// The subscriber's end of the bus.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<EventEnvelope>,
    bus: Arc<BusInner>,
}

impl EventStream {
    /// Next envelope, or `None` once the bus is closed and drained.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        loop {
            if self.bus.closed.load(Ordering::SeqCst) {
                // Drain whatever was published before the close.
                return match self.rx.try_recv() {
                    Ok(envelope) => Some(envelope),
                    Err(_) => None,
                };
            }
            match tokio::time::timeout(std::time::Duration::from_millis(50), self.rx.recv()).await
            {
                Ok(envelope) => return envelope,
                Err(_) => continue, // periodic close check
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
