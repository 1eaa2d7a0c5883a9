//! Combat contracts shared by the player and enemies.
//!
//! This module provides:
//! - The [`Damageable`] and [`Attacker`] capability traits
//! - Per-character damage/death/corpse notices
//! - [`CombatHub`], an explicit publish/subscribe channel owned by each character

use std::sync::{Arc, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use duskblade_common::{EntityId, SubscriptionId, Vec3};

/// Kind of weapon that landed a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// No weapon (scripted or environmental damage)
    #[default]
    None,
    /// Player sword
    Sword,
    /// Enemy claws/bite
    Claw,
}

/// Notices a character publishes on its own hub.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatNotice {
    /// A hit was applied
    TookDamage {
        /// Damage amount
        amount: i32,
        /// Where the hit landed
        contact_point: Vec3,
        /// Weapon that landed it
        weapon: WeaponKind,
    },
    /// The character died
    Died {
        /// Dying character
        actor: EntityId,
        /// Where it died
        position: Vec3,
    },
    /// The corpse was removed from the world
    CorpseCleared {
        /// Cleared character
        actor: EntityId,
        /// Where the clearing effect plays
        position: Vec3,
    },
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<CombatNotice>)>,
}

/// Publish/subscribe channel for one character's combat notices.
///
/// Cloning yields another handle to the same hub.
#[derive(Debug, Clone, Default)]
pub struct CombatHub {
    inner: Arc<Mutex<HubInner>>,
}

impl CombatHub {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    ///
    /// The subscription stays registered until it is cancelled or dropped.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = unbounded();
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = SubscriptionId::new(inner.next_id);
        inner.subscribers.push((id, sender));
        trace!(subscription = id.raw(), "hub subscription added");
        Subscription {
            id,
            receiver,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub, _)| *sub != id);
        inner.subscribers.len() != before
    }

    /// Deliver a notice to every subscriber.
    pub fn publish(&self, notice: CombatNotice) {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|(_, sender)| sender.send(notice).is_ok());
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// A registration on a [`CombatHub`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<CombatNotice>,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    /// Subscription ID within its hub.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Take every notice delivered so far.
    pub fn drain(&self) -> Vec<CombatNotice> {
        self.receiver.try_iter().collect()
    }

    /// Unsubscribe explicitly.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let id = self.id;
            inner.lock().subscribers.retain(|(sub, _)| *sub != id);
            trace!(subscription = id.raw(), "hub subscription removed");
        }
    }
}

/// Handle to another character used for aggro tracking.
#[derive(Debug, Clone)]
pub struct TargetRef {
    /// Target entity
    pub entity_id: EntityId,
    /// Target's notification hub
    pub hub: CombatHub,
}

/// Something that can be hit and killed.
pub trait Damageable {
    /// Entity ID of this character.
    fn entity_id(&self) -> EntityId;

    /// Current world position.
    fn position(&self) -> Vec3;

    /// Hub carrying this character's combat notices.
    fn hub(&self) -> &CombatHub;

    /// Check if the character is dead.
    fn is_dead(&self) -> bool;

    /// Apply a hit.
    fn take_damage(&mut self, amount: i32, contact_point: Vec3, weapon: WeaponKind);

    /// Kill the character.
    fn die(&mut self);

    /// Handle other characters use to track this one.
    fn target_ref(&self) -> TargetRef {
        TargetRef {
            entity_id: self.entity_id(),
            hub: self.hub().clone(),
        }
    }
}

/// Something that deals damage.
pub trait Attacker {
    /// Set the damage the next resolved hit will deal.
    fn set_current_damage(&mut self, amount: i32);

    /// Damage the next resolved hit will deal.
    fn current_damage(&self) -> i32;
}
