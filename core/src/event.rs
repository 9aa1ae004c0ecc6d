//! The event bus: inbound save triggers and outbound notifications.
//!
//! RULE: The flag registry and resource pool never call the save system.
//! They publish onto the world's bus; the save system drains it on its
//! next pump and decides what to persist.

use crate::types::{SlotName, Tick};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every event the save system produces or consumes.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SaveEvent {
    // ── Inbound triggers ───────────────────────────
    FlagChanged {
        flag_id: String,
        is_set:  bool,
    },
    SaveRequested,

    // ── Informational ──────────────────────────────
    ResourceChanged {
        resource: i32,
        amount:   f32,
    },
    LoadScheduled {
        slot:  SlotName,
        delay: Tick,
    },
    LoadCancelled {
        slot: SlotName,
    },
    LoadFailed {
        slot:   SlotName,
        reason: String,
    },
    SlotReset {
        slot: SlotName,
    },

    // ── Outbound completion signals ────────────────
    SaveCompleted {
        slot:     SlotName,
        saved_at: DateTime<Utc>,
    },
    LoadCompleted {
        slot:       SlotName,
        matched:    usize,
        backfilled: usize,
        stale:      usize,
    },
}

impl SaveEvent {
    /// Stable short name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SaveEvent::FlagChanged { .. }     => "flag_changed",
            SaveEvent::SaveRequested          => "save_requested",
            SaveEvent::ResourceChanged { .. } => "resource_changed",
            SaveEvent::LoadScheduled { .. }   => "load_scheduled",
            SaveEvent::LoadCancelled { .. }   => "load_cancelled",
            SaveEvent::LoadFailed { .. }      => "load_failed",
            SaveEvent::SlotReset { .. }       => "slot_reset",
            SaveEvent::SaveCompleted { .. }   => "save_completed",
            SaveEvent::LoadCompleted { .. }   => "load_completed",
        }
    }

    /// True for the events that ask for a save.
    pub fn requests_save(&self) -> bool {
        matches!(self, SaveEvent::FlagChanged { .. } | SaveEvent::SaveRequested)
    }
}

pub type Subscriber = Box<dyn FnMut(&SaveEvent) + Send>;

/// Publish/subscribe outbox. Published events queue until `drain()`,
/// which hands each one to every subscriber in subscription order.
#[derive(Default)]
pub struct EventBus {
    queue:       Vec<SaveEvent>,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&SaveEvent) + Send + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&mut self, event: SaveEvent) {
        log::trace!("event queued: {}", event.kind());
        self.queue.push(event);
    }

    /// Deliver every queued event to the subscribers and return them.
    pub fn drain(&mut self) -> Vec<SaveEvent> {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            for subscriber in &mut self.subscribers {
                subscriber(event);
            }
        }
        events
    }

    /// Publish and deliver immediately.
    pub fn emit(&mut self, event: SaveEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queue", &self.queue)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn drain_delivers_in_publish_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut bus = EventBus::new();
        bus.subscribe(move |e| sink.lock().unwrap().push(e.kind()));

        bus.publish(SaveEvent::SaveRequested);
        bus.publish(SaveEvent::FlagChanged { flag_id: "lights-on".into(), is_set: true });
        assert_eq!(bus.pending(), 2);

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(bus.pending(), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["save_requested", "flag_changed"]);
    }

    #[test]
    fn emit_bypasses_the_queue() {
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);

        let mut bus = EventBus::new();
        bus.subscribe(move |_| *sink.lock().unwrap() += 1);
        bus.emit(SaveEvent::SlotReset { slot: "save".into() });

        assert_eq!(bus.pending(), 0);
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
