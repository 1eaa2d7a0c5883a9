//! Game session: owns the event bus and every character.
//!
//! The session is the single place where characters meet. It fixes the
//! per-tick order (player, then enemies), routes hits from an attacker's
//! current damage to the target, and maps sensor overlaps onto aggro.

use tracing::{debug, info};

use duskblade_common::{EntityId, Vec3};

use crate::combat::{Attacker, Damageable, WeaponKind};
use crate::data::{EnemyData, PlayerData};
use crate::effects::{EffectRequest, ImpactEffects};
use crate::enemy::EnemyController;
use crate::error::GameplayResult;
use crate::events::{EventBus, GameEvent};
use crate::facts::WorldFacts;
use crate::input::PlayerInput;
use crate::player::Player;

/// An enemy together with the effects listener attached to it.
#[derive(Debug)]
struct EnemySlot {
    controller: EnemyController<WorldFacts>,
    effects: ImpactEffects,
}

/// A running game session.
#[derive(Debug)]
pub struct GameSession {
    bus: EventBus,
    player: Player,
    player_effects: ImpactEffects,
    enemies: Vec<EnemySlot>,
    elapsed: f32,
}

impl GameSession {
    /// Start a session with the player at `spawn`.
    pub fn new(player_data: PlayerData, spawn: Vec3, bus_capacity: usize) -> GameplayResult<Self> {
        let bus = EventBus::new(bus_capacity);
        let player = Player::new(spawn, player_data, bus.publisher())?;
        let player_effects = ImpactEffects::attach(player.hub());
        info!(capacity = bus_capacity, "session started");

        Ok(Self {
            bus,
            player,
            player_effects,
            enemies: Vec::new(),
            elapsed: 0.0,
        })
    }

    /// Build, activate, and register an enemy. Returns its entity ID.
    pub fn spawn_enemy(
        &mut self,
        data: EnemyData,
        position: Vec3,
        seed: Option<u64>,
    ) -> GameplayResult<EntityId> {
        let mut controller =
            EnemyController::new(position, data, WorldFacts::new(), self.bus.publisher())?;
        if let Some(seed) = seed {
            controller = controller.with_seed(seed);
        }
        controller.activate();
        let effects = ImpactEffects::attach(controller.hub());
        let entity_id = controller.entity_id();
        self.enemies.push(EnemySlot {
            controller,
            effects,
        });
        Ok(entity_id)
    }

    /// Advance the whole session by one tick.
    pub fn tick(&mut self, input: &PlayerInput, grounded: bool, dt: f32) {
        self.player.tick(input, grounded, dt);
        for slot in &mut self.enemies {
            slot.controller.tick(dt);
        }
        self.elapsed += dt;
    }

    /// Apply the player's current attack damage to an enemy.
    ///
    /// Returns `false` if no hit landed.
    pub fn resolve_player_hit(&mut self, enemy: EntityId, contact_point: Vec3) -> bool {
        let damage = self.player.current_damage();
        if damage <= 0 || self.player.is_dead() {
            return false;
        }
        let Some(slot) = self.slot_mut(enemy) else {
            return false;
        };
        if !slot.controller.hit_detection_enabled() {
            return false;
        }
        slot.controller
            .take_damage(damage, contact_point, WeaponKind::Sword);
        debug!(target = %enemy, damage, "player hit resolved");
        true
    }

    /// Apply an enemy's current attack damage to the player.
    ///
    /// Returns `false` if no hit landed.
    pub fn resolve_enemy_hit(&mut self, enemy: EntityId, contact_point: Vec3) -> bool {
        let damage = match self.enemy(enemy) {
            Some(controller) if !controller.is_dead() => controller.current_damage(),
            _ => return false,
        };
        if damage <= 0 || self.player.is_dead() {
            return false;
        }
        self.player
            .take_damage(damage, contact_point, WeaponKind::Claw);
        debug!(source = %enemy, damage, "enemy hit resolved");
        true
    }

    /// The player entered (`inside`) or left an enemy's sensor.
    pub fn sense_player(&mut self, enemy: EntityId, inside: bool) {
        let target = self.player.target_ref();
        if let Some(slot) = self.slot_mut(enemy) {
            if inside {
                slot.controller.set_player_on(&target);
            } else {
                slot.controller.set_player_off(&target);
            }
        }
    }

    /// Effect requests produced since the last call.
    pub fn drain_effects(&self) -> Vec<EffectRequest> {
        let mut requests = self.player_effects.poll();
        for slot in &self.enemies {
            requests.extend(slot.effects.poll());
        }
        requests
    }

    /// Session events produced since the last call.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.bus.drain()
    }

    /// End the session: deactivate every enemy and return undelivered events.
    pub fn shutdown(mut self) -> Vec<GameEvent> {
        for slot in &mut self.enemies {
            slot.controller.deactivate();
        }
        let events = self.bus.drain();
        info!(elapsed = self.elapsed, pending = events.len(), "session ended");
        events
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Look up an enemy.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&EnemyController<WorldFacts>> {
        self.enemies
            .iter()
            .find(|slot| slot.controller.entity_id() == id)
            .map(|slot| &slot.controller)
    }

    /// Look up an enemy mutably.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut EnemyController<WorldFacts>> {
        self.slot_mut(id).map(|slot| &mut slot.controller)
    }

    /// Every enemy in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = &EnemyController<WorldFacts>> {
        self.enemies.iter().map(|slot| &slot.controller)
    }

    /// Seconds simulated so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut EnemySlot> {
        self.enemies
            .iter_mut()
            .find(|slot| slot.controller.entity_id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use crate::player::PlayerStateKind;

    const DT: f32 = 1.0 / 60.0;

    fn session() -> (GameSession, EntityId) {
        let mut session = GameSession::new(PlayerData::default(), Vec3::ZERO, 256).unwrap();
        let enemy = session
            .spawn_enemy(EnemyData::default(), Vec3::new(3.0, 0.0, 0.0), Some(1))
            .unwrap();
        (session, enemy)
    }

    #[test]
    fn test_spawn_events() {
        let (session, enemy) = session();
        let events = session.drain_events();

        assert!(matches!(events[0], GameEvent::PlayerSpawned { max_health: 10, .. }));
        assert!(matches!(
            events[1],
            GameEvent::EnemySpawned { entity_id, .. } if entity_id == enemy
        ));
    }

    #[test]
    fn test_player_attack_hits_enemy() {
        let (mut session, enemy) = session();
        let contact = Vec3::new(2.5, 1.0, 0.0);

        assert!(!session.resolve_player_hit(enemy, contact));

        session.tick(&PlayerInput::new().with_attack(), true, DT);
        assert!(session.resolve_player_hit(enemy, contact));
        assert_eq!(session.enemy(enemy).unwrap().health(), 9);
        assert_eq!(
            session.drain_effects(),
            vec![EffectRequest {
                kind: EffectKind::Impact,
                position: contact,
            }]
        );
    }

    #[test]
    fn test_unknown_enemy_is_a_miss() {
        let (mut session, _enemy) = session();
        session.tick(&PlayerInput::new().with_attack(), true, DT);

        assert!(!session.resolve_player_hit(EntityId::new(), Vec3::ZERO));
        assert!(!session.resolve_enemy_hit(EntityId::new(), Vec3::ZERO));
    }

    #[test]
    fn test_enemy_attack_hits_player() {
        let (mut session, enemy) = session();
        session.enemy_mut(enemy).unwrap().set_current_damage(3);

        assert!(session.resolve_enemy_hit(enemy, Vec3::X));
        assert_eq!(session.player().health(), 7);
        assert_eq!(session.player().state(), PlayerStateKind::TakeDamage);
    }

    #[test]
    fn test_player_death_ends_aggro() {
        let (mut session, enemy) = session();
        session.sense_player(enemy, true);
        assert!(session.enemy(enemy).unwrap().is_alert());

        session.enemy_mut(enemy).unwrap().set_current_damage(10);
        assert!(session.resolve_enemy_hit(enemy, Vec3::X));
        assert!(session.player().is_dead());

        session.tick(&PlayerInput::new(), true, DT);
        assert!(!session.enemy(enemy).unwrap().is_alert());
        assert!(!session.resolve_enemy_hit(enemy, Vec3::X));
    }

    #[test]
    fn test_sensor_exit_drops_aggro_after_delay() {
        let (mut session, enemy) = session();
        session.sense_player(enemy, true);
        session.sense_player(enemy, false);

        for _ in 0..200 {
            session.tick(&PlayerInput::new(), true, DT);
        }
        assert!(!session.enemy(enemy).unwrap().is_alert());
    }

    #[test]
    fn test_shutdown_deactivates_enemies() {
        let (mut session, enemy) = session();
        session.sense_player(enemy, true);

        let events = session.shutdown();
        assert_eq!(events.len(), 2);
    }
}
