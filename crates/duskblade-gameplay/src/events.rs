//! Session event bus for process-wide gameplay notifications.
//!
//! One bus is created per game session and handed to every character as an
//! [`EventPublisher`]. UI and analytics collaborators drain it once per frame.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use duskblade_common::EntityId;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player created; HUD initializes from it
    PlayerSpawned {
        /// Player entity
        entity_id: EntityId,
        /// Max health for the health bar
        max_health: i32,
    },
    /// Player touched down
    PlayerLanded {
        /// Player entity
        entity_id: EntityId,
    },
    /// Player died
    PlayerDied {
        /// Player entity
        entity_id: EntityId,
    },
    /// Enemy activated (first spawn or pooled reuse)
    EnemySpawned {
        /// Enemy entity
        entity_id: EntityId,
        /// Max health
        max_health: i32,
        /// Max stamina
        max_stamina: i32,
    },
    /// Enemy took a hit
    EnemyTookDamage {
        /// Enemy entity
        entity_id: EntityId,
        /// Damage amount
        damage: i32,
    },
    /// Enemy died
    EnemyDied {
        /// Enemy entity
        entity_id: EntityId,
    },
    /// Enemy staggered
    EnemyStaggered {
        /// Enemy entity
        entity_id: EntityId,
        /// Staggers so far, including this one
        stagger_count: u32,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        self.publisher().publish(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a publishing handle for a character.
    #[must_use]
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            sender: self.sender.clone(),
        }
    }
}

/// Publishing half of the session bus, held by each character.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: Sender<GameEvent>,
}

impl EventPublisher {
    /// Publishes an event. Never blocks; if the bus is full the event is dropped.
    pub fn publish(&self, event: GameEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(event)) => warn!(?event, "event bus full, dropping event"),
            Err(TrySendError::Disconnected(_)) => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        let entity_id = EntityId::new();
        let publisher = bus.publisher();

        publisher.publish(GameEvent::EnemyDied { entity_id });
        bus.publish(GameEvent::PlayerLanded { entity_id });

        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events[0], GameEvent::EnemyDied { entity_id });
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        let entity_id = EntityId::new();

        bus.publish(GameEvent::EnemyDied { entity_id });
        bus.publish(GameEvent::PlayerDied { entity_id });

        assert_eq!(bus.drain(), vec![GameEvent::EnemyDied { entity_id }]);
    }

    #[test]
    fn test_publisher_outlives_bus() {
        let bus = EventBus::new(4);
        let publisher = bus.publisher();
        drop(bus);

        // Sender keeps the channel alive; publishing must not panic.
        publisher.publish(GameEvent::PlayerDied {
            entity_id: EntityId::new(),
        });
    }
}
