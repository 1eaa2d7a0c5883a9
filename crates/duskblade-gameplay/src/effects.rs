//! Cosmetic particle requests driven by combat notices.
//!
//! Particle pooling and playback belong to the host. This module only turns
//! a character's notices into spawn requests.

use serde::{Deserialize, Serialize};

use duskblade_common::Vec3;

use crate::combat::{CombatHub, CombatNotice, Subscription};

/// Particle effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Hit spark at a contact point
    Impact,
    /// Smoke puff when a corpse is cleared
    Poof,
}

/// A request to spawn one particle effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectRequest {
    /// Effect to spawn
    pub kind: EffectKind,
    /// Where to spawn it
    pub position: Vec3,
}

/// Listens to one character's hub and emits effect requests.
///
/// Dropping it unsubscribes from the hub.
#[derive(Debug)]
pub struct ImpactEffects {
    subscription: Subscription,
}

impl ImpactEffects {
    /// Start listening to `hub`.
    #[must_use]
    pub fn attach(hub: &CombatHub) -> Self {
        Self {
            subscription: hub.subscribe(),
        }
    }

    /// Effect requests for every notice received since the last poll.
    pub fn poll(&self) -> Vec<EffectRequest> {
        self.subscription
            .drain()
            .into_iter()
            .filter_map(|notice| match notice {
                CombatNotice::TookDamage { contact_point, .. } => Some(EffectRequest {
                    kind: EffectKind::Impact,
                    position: contact_point,
                }),
                CombatNotice::CorpseCleared { position, .. } => Some(EffectRequest {
                    kind: EffectKind::Poof,
                    position,
                }),
                CombatNotice::Died { .. } => None,
            })
            .collect()
    }
}
