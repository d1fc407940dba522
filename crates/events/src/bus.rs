//! Event bus implementation using tokio broadcast channels
//!
//! Emission is fire-and-forget: a send never blocks the emitter and
//! subscriber failures never propagate back. Every emitted envelope is
//! also appended to a size-bounded in-memory log (drop-oldest) that can be
//! dumped on demand for audit.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::{Event, EventEnvelope};

/// Capacity for the broadcast channel
const DEFAULT_CAPACITY: usize = 1000;

/// Maximum envelopes retained in the in-memory log
const DEFAULT_LOG_CAPACITY: usize = 1024;

/// Event bus for publishing and subscribing to pipeline events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    log: Arc<Mutex<VecDeque<EventEnvelope>>>,
    log_capacity: usize,
    /// Number of events emitted (for monitoring)
    event_count: Arc<AtomicUsize>,
}

impl EventBus {
    /// Create a new event bus with default capacities
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_LOG_CAPACITY)
    }

    /// Create a new event bus with explicit channel and log capacities
    pub fn with_capacity(channel_capacity: usize, log_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity);
        Self {
            sender,
            log: Arc::new(Mutex::new(VecDeque::with_capacity(log_capacity))),
            log_capacity,
            event_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Emit an event for the given run.
    ///
    /// Appends to the bounded log, evicting the oldest entry when full,
    /// then dispatches to all subscribers. Returns the number of
    /// subscribers that received the event; with no subscribers the event
    /// is only logged.
    pub fn emit(&self, trace_id: Uuid, event: Event) -> usize {
        self.publish(EventEnvelope::new(trace_id, event))
    }

    /// Publish a pre-built envelope
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.event_count.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut log) = self.log.lock() {
            if log.len() >= self.log_capacity {
                log.pop_front();
            }
            log.push_back(envelope.clone());
        }

        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events
    ///
    /// Returns a receiver that will receive all events published after
    /// this call. Slow subscribers observe a lag error, they never block
    /// the emitter.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Snapshot of the retained event log, oldest first
    pub fn recent(&self) -> Vec<EventEnvelope> {
        self.log
            .lock()
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the total number of events emitted
    pub fn event_count(&self) -> usize {
        self.event_count.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("event_count", &self.event_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_changed() -> Event {
        Event::StageChanged {
            from: "extraction".to_string(),
            to: "drafting".to_string(),
        }
    }

    #[tokio::test]
    async fn test_emit_and_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let trace_id = Uuid::new_v4();

        let sent = bus.emit(trace_id, stage_changed());
        assert_eq!(sent, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.trace_id, trace_id);
        assert_eq!(received.event.kind(), "stage.changed");
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let sent = bus.emit(Uuid::new_v4(), stage_changed());
        assert_eq!(sent, 2);

        let received1 = rx1.recv().await.unwrap();
        let received2 = rx2.recv().await.unwrap();
        assert_eq!(received1.id, received2.id);
    }

    #[tokio::test]
    async fn test_no_subscribers_still_logged() {
        let bus = EventBus::new();

        let sent = bus.emit(Uuid::new_v4(), stage_changed());
        assert_eq!(sent, 0);
        assert_eq!(bus.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_log_drops_oldest_when_full() {
        let bus = EventBus::with_capacity(16, 3);
        let trace_id = Uuid::new_v4();

        for i in 0..5 {
            bus.emit(
                trace_id,
                Event::WorkerStarted {
                    worker: format!("worker-{}", i),
                    stage: "extraction".to_string(),
                },
            );
        }

        let log = bus.recent();
        assert_eq!(log.len(), 3);
        match &log[0].event {
            Event::WorkerStarted { worker, .. } => assert_eq!(worker, "worker-2"),
            _ => panic!("Wrong event type"),
        }
        assert_eq!(bus.event_count(), 5);
    }

    #[tokio::test]
    async fn test_subscriber_order_preserved() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let trace_id = Uuid::new_v4();

        for i in 0..4 {
            bus.emit(
                trace_id,
                Event::WorkerStarted {
                    worker: format!("worker-{}", i),
                    stage: "drafting".to_string(),
                },
            );
        }

        for i in 0..4 {
            let envelope = rx.recv().await.unwrap();
            match envelope.event {
                Event::WorkerStarted { worker, .. } => {
                    assert_eq!(worker, format!("worker-{}", i));
                }
                _ => panic!("Wrong event type"),
            }
        }
    }

    #[test]
    fn test_clone_shares_log() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        bus2.emit(Uuid::new_v4(), stage_changed());
        assert_eq!(bus1.recent().len(), 1);
        assert_eq!(bus1.event_count(), 1);
    }
}
