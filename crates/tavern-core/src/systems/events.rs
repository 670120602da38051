//! Outbound simulation events.
//!
//! Systems push events as things happen; the caller drains them once per
//! frame to drive animation and UI.

use std::collections::VecDeque;

use hecs::Entity;

use crate::components::StateKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Play `idle_<dir>` or `walk_<dir>`. Sent only when the cue changes.
    AnimationCue { entity: Entity, cue: String },
    StateChanged {
        entity: Entity,
        from: StateKind,
        to: StateKind,
    },
    GuestSpawned { entity: Entity, name: String },
    GuestDeparted { entity: Entity },
    OrderPlaced {
        entity: Entity,
        item_id: String,
        recipe_id: String,
    },
    OrderServed { entity: Entity, item_id: String },
    /// Two characters went for the same chair and this one lost.
    ChairContended { entity: Entity, chair: Entity },
}

/// Events kept before the oldest are dropped.
pub const MAX_QUEUED_EVENTS: usize = 8192;

/// Bounded FIFO of pending events.
///
/// Callers are expected to drain once per frame. If nobody does, the oldest
/// events are discarded so the queue stays at [`MAX_QUEUED_EVENTS`].
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SimEvent>,
    dropped: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            self.events.pop_front();
            if self.dropped == 0 {
                log::warn!(
                    "event queue full ({} events), dropping oldest; drain it every frame",
                    MAX_QUEUED_EVENTS
                );
            }
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded since the last drain.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.dropped = 0;
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departed(world: &mut hecs::World) -> SimEvent {
        SimEvent::GuestDeparted {
            entity: world.spawn(()),
        }
    }

    #[test]
    fn test_queue_is_bounded_and_keeps_newest() {
        let mut world = hecs::World::new();
        let mut queue = EventQueue::new();
        let first = departed(&mut world);
        queue.push(first.clone());
        for _ in 0..MAX_QUEUED_EVENTS {
            queue.push(departed(&mut world));
        }
        let last = departed(&mut world);
        queue.push(last.clone());

        assert_eq!(queue.len(), MAX_QUEUED_EVENTS);
        assert_eq!(queue.dropped(), 2);
        assert!(queue.iter().all(|e| *e != first));
        assert_eq!(queue.iter().last(), Some(&last));

        let drained = queue.drain();
        assert_eq!(drained.len(), MAX_QUEUED_EVENTS);
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 0);
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut world = hecs::World::new();
        let mut queue = EventQueue::new();
        let a = departed(&mut world);
        let b = departed(&mut world);
        queue.push(a.clone());
        queue.push(b.clone());
        assert_eq!(queue.drain(), vec![a, b]);
    }
}
