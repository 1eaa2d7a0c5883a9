//! # Duskblade Gameplay
//!
//! Character behavior and state control for Duskblade.
//!
//! This crate provides the CPU-side character layer:
//! - Player controller driven by a table-dispatched state machine
//! - Enemy controller (vitals, stamina, stagger, aggro) feeding planner facts
//! - Combat contracts and per-character notification hubs
//! - Cooperative one-shot timers
//! - Session event bus for UI/analytics notifications
//! - Game session tying characters together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod combat;
pub mod data;
pub mod effects;
pub mod enemy;
pub mod error;
pub mod events;
pub mod facts;
pub mod input;
pub mod player;
pub mod session;
pub mod timer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::combat::*;
    pub use crate::data::*;
    pub use crate::effects::*;
    pub use crate::enemy::*;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::facts::*;
    pub use crate::input::*;
    pub use crate::player::*;
    pub use crate::session::*;
    pub use crate::timer::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use duskblade_common::Vec3;

    #[test]
    fn test_duel_to_the_death() {
        let mut session = GameSession::new(PlayerData::default(), Vec3::ZERO, 512).unwrap();
        let enemy = session
            .spawn_enemy(EnemyData::default(), Vec3::new(1.5, 0.0, 0.0), Some(3))
            .unwrap();
        session.sense_player(enemy, true);

        // Mash attack until the enemy falls
        let attack = PlayerInput::new().with_attack();
        for _ in 0..600 {
            session.tick(&attack, true, 1.0 / 60.0);
            session.resolve_player_hit(enemy, Vec3::new(1.0, 1.0, 0.0));
            if session.enemy(enemy).unwrap().is_dead() {
                break;
            }
        }

        let foe = session.enemy(enemy).unwrap();
        assert!(foe.is_dead());
        assert!(foe.facts().has_fact(IS_DEAD));

        let events = session.shutdown();
        assert!(events.contains(&GameEvent::EnemyDied { entity_id: enemy }));
    }

    #[test]
    fn test_prelude_exports() {
        let _ = PlayerStateKind::Idle;
        let _ = SensorMode::Rest;
        let _: Timers<()> = Timers::new();
        assert_eq!(CURRENT_STAMINA, "CurrentStamina");
    }
}
