//! Player character driven by a finite state machine.
//!
//! Each tick runs in two phases:
//! 1. [`Player::logic_step`]: timers advance, then the active state decides
//!    on a transition.
//! 2. [`Player::physics_step`]: the active state constrains velocity, then
//!    the player integrates position from it.
//!
//! Transitions are immediate: the old state's `exit` runs, then the new
//! state's `enter`. Die is terminal.

mod airborne;
mod attack;
mod locomotion;
mod reaction;
mod state;

pub use state::{AnimationCue, PlayerAnimation, PlayerStateKind};

use duskblade_common::{confine_to_plane, EntityId, Facing, Vec3};
use tracing::{debug, info};

use crate::combat::{Attacker, CombatHub, CombatNotice, Damageable, WeaponKind};
use crate::data::PlayerData;
use crate::error::GameplayResult;
use crate::events::{EventPublisher, GameEvent};
use crate::input::PlayerInput;
use state::{handlers, validate_state_table, PlayerContext};

/// The player character.
#[derive(Debug)]
pub struct Player {
    /// Position in world space
    position: Vec3,
    /// Current health, kept in [0, max]
    health: i32,
    /// Active state
    state: PlayerStateKind,
    /// Fields shared by all states
    ctx: PlayerContext,
    /// Damage/death notices for other characters and effects
    hub: CombatHub,
}

impl Player {
    /// Create a player standing in Idle at `position`.
    ///
    /// Fails if the data record or the state table is unusable.
    pub fn new(position: Vec3, data: PlayerData, publisher: EventPublisher) -> GameplayResult<Self> {
        data.validate()?;
        validate_state_table()?;

        let entity_id = EntityId::new();
        let health = data.max_health;
        let mut ctx = PlayerContext::new(entity_id, data, publisher);
        (handlers(PlayerStateKind::Idle).enter)(&mut ctx);

        ctx.publisher.publish(GameEvent::PlayerSpawned {
            entity_id,
            max_health: health,
        });
        info!(entity = %entity_id, health, "player spawned");

        Ok(Self {
            position: confine_to_plane(position),
            health,
            state: PlayerStateKind::Idle,
            ctx,
            hub: CombatHub::new(),
        })
    }

    /// Active state.
    #[must_use]
    pub fn state(&self) -> PlayerStateKind {
        self.state
    }

    /// State active before the current one.
    #[must_use]
    pub fn last_state(&self) -> PlayerStateKind {
        self.ctx.last_state
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.ctx.velocity
    }

    /// Horizontal target speed before the active speed modifier.
    #[must_use]
    pub fn raw_horizontal_velocity(&self) -> f32 {
        self.ctx.raw_horizontal
    }

    /// Direction the player faces.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.ctx.facing
    }

    /// Jumps taken since last touching the ground.
    #[must_use]
    pub fn jump_count(&self) -> u32 {
        self.ctx.jump_count
    }

    /// Current combo step (0 outside attacks).
    #[must_use]
    pub fn combo_count(&self) -> u32 {
        self.ctx.attack.combo
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.ctx.data.max_health
    }

    /// Check if movement control is enabled.
    #[must_use]
    pub fn movement_enabled(&self) -> bool {
        self.ctx.movement_enabled
    }

    /// Last animation request.
    #[must_use]
    pub fn animation(&self) -> AnimationCue {
        self.ctx.animation
    }

    /// Player tuning.
    #[must_use]
    pub fn data(&self) -> &PlayerData {
        &self.ctx.data
    }

    /// Snap the player to a resolved position (host collision response).
    pub fn set_position(&mut self, position: Vec3) {
        self.position = confine_to_plane(position);
    }

    /// Run one full tick: logic then physics.
    pub fn tick(&mut self, input: &PlayerInput, grounded: bool, dt: f32) {
        self.logic_step(input, grounded, dt);
        self.physics_step(dt);
    }

    /// Advance timers and let the active state pick a transition.
    pub fn logic_step(&mut self, input: &PlayerInput, grounded: bool, dt: f32) {
        self.ctx.grounded = grounded;
        self.ctx.dt = dt;
        self.ctx.jump_buffer = (self.ctx.jump_buffer - dt).max(0.0);
        self.ctx.fired = self.ctx.timers.advance(dt);

        if let Some(next) = (handlers(self.state).logic)(&mut self.ctx, input) {
            self.change_state(next);
        }
        self.ctx.fired.clear();
    }

    /// Constrain velocity for the active state and integrate position.
    pub fn physics_step(&mut self, dt: f32) {
        (handlers(self.state).physics)(&mut self.ctx);
        if self.ctx.movement_enabled {
            self.position = confine_to_plane(self.position + self.ctx.velocity * dt);
        }
    }

    /// Exit the active state and enter `next`. Ignored once dead.
    fn change_state(&mut self, next: PlayerStateKind) {
        if self.state == PlayerStateKind::Die {
            debug!(entity = %self.ctx.entity_id, to = next.name(), "dead player ignores transition");
            return;
        }
        (handlers(self.state).exit)(&mut self.ctx);
        debug!(
            entity = %self.ctx.entity_id,
            from = self.state.name(),
            to = next.name(),
            "player state change"
        );
        self.ctx.last_state = self.state;
        self.state = next;
        (handlers(next).enter)(&mut self.ctx);
    }
}

impl Damageable for Player {
    fn entity_id(&self) -> EntityId {
        self.ctx.entity_id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn hub(&self) -> &CombatHub {
        &self.hub
    }

    fn is_dead(&self) -> bool {
        self.state == PlayerStateKind::Die
    }

    fn take_damage(&mut self, amount: i32, contact_point: Vec3, weapon: WeaponKind) {
        if self.is_dead() {
            return;
        }
        let remaining = self.health - amount;
        self.health = remaining.clamp(0, self.ctx.data.max_health);

        self.hub.publish(CombatNotice::TookDamage {
            amount,
            contact_point,
            weapon,
        });

        if remaining <= 0 {
            self.die();
        } else {
            self.change_state(PlayerStateKind::TakeDamage);
        }
    }

    fn die(&mut self) {
        if self.is_dead() {
            return;
        }
        self.health = 0;
        self.change_state(PlayerStateKind::Die);
        info!(entity = %self.ctx.entity_id, "player died");

        self.ctx.publisher.publish(GameEvent::PlayerDied {
            entity_id: self.ctx.entity_id,
        });
        self.hub.publish(CombatNotice::Died {
            actor: self.ctx.entity_id,
            position: self.position,
        });
    }
}

impl Attacker for Player {
    fn set_current_damage(&mut self, amount: i32) {
        self.ctx.current_damage = amount;
    }

    fn current_damage(&self) -> i32 {
        self.ctx.current_damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameplayError;
    use crate::events::EventBus;

    const DT: f32 = 1.0 / 60.0;

    fn spawn() -> (Player, EventBus) {
        let bus = EventBus::new(256);
        let player = Player::new(Vec3::ZERO, PlayerData::default(), bus.publisher()).unwrap();
        (player, bus)
    }

    /// Tick until `done` holds or `max_ticks` run out. Returns ticks used.
    fn tick_until(
        player: &mut Player,
        input: PlayerInput,
        grounded: bool,
        max_ticks: usize,
        done: impl Fn(&Player) -> bool,
    ) -> Option<usize> {
        for n in 1..=max_ticks {
            player.tick(&input, grounded, DT);
            if done(player) {
                return Some(n);
            }
        }
        None
    }

    /// Jump once and fall until descending.
    fn airborne_falling(player: &mut Player) {
        player.tick(&PlayerInput::new().with_jump(), true, DT);
        tick_until(player, PlayerInput::new(), false, 120, |p| {
            p.state() == PlayerStateKind::Fall
        })
        .unwrap();
    }

    #[test]
    fn test_spawn_publishes_health() {
        let (player, bus) = spawn();

        assert_eq!(player.state(), PlayerStateKind::Idle);
        assert_eq!(player.animation().clip, PlayerAnimation::Idle);
        assert_eq!(
            bus.drain(),
            vec![GameEvent::PlayerSpawned {
                entity_id: player.entity_id(),
                max_health: 10,
            }]
        );
    }

    #[test]
    fn test_invalid_data_rejected() {
        let bus = EventBus::new(4);
        let data = PlayerData {
            max_health: 0,
            ..PlayerData::default()
        };

        let err = Player::new(Vec3::ZERO, data, bus.publisher()).unwrap_err();
        assert!(matches!(err, GameplayError::InvalidData { field: "max_health", .. }));
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_position_confined_to_plane() {
        let bus = EventBus::new(4);
        let mut player =
            Player::new(Vec3::new(1.0, 0.0, 3.0), PlayerData::default(), bus.publisher()).unwrap();
        player.tick(&PlayerInput::moving(1.0), true, DT);
        player.tick(&PlayerInput::moving(1.0), true, DT);

        assert_eq!(player.position().z, 0.0);
        assert!(player.position().x > 1.0);
    }

    #[test]
    fn test_move_and_release() {
        let (mut player, _bus) = spawn();

        player.tick(&PlayerInput::moving(-1.0), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Move);

        player.tick(&PlayerInput::moving(-1.0), true, DT);
        assert_eq!(player.velocity().x, -6.0);
        assert_eq!(player.facing(), Facing::Left);

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Idle);
        assert_eq!(player.velocity().x, 0.0);
    }

    #[test]
    fn test_walk_off_ledge_falls() {
        let (mut player, _bus) = spawn();

        player.tick(&PlayerInput::new(), false, DT);
        assert_eq!(player.state(), PlayerStateKind::Fall);
    }

    #[test]
    fn test_double_jump() {
        let (mut player, _bus) = spawn();
        let jump = PlayerInput::new().with_jump();

        player.tick(&jump, true, DT);
        assert_eq!(player.state(), PlayerStateKind::Jump);
        assert_eq!(player.jump_count(), 1);
        assert!(player.velocity().y > 0.0);

        player.tick(&jump, false, DT);
        assert_eq!(player.state(), PlayerStateKind::Jump);
        assert_eq!(player.jump_count(), 2);
        assert_eq!(player.last_state(), PlayerStateKind::Jump);

        // Out of jumps: the press is only buffered
        let plays = player.animation().plays;
        player.tick(&jump, false, DT);
        assert_eq!(player.state(), PlayerStateKind::Jump);
        assert_eq!(player.jump_count(), 2);
        assert_eq!(player.animation().plays, plays);
    }

    #[test]
    fn test_fall_land_idle() {
        let (mut player, bus) = spawn();
        airborne_falling(&mut player);
        bus.drain();

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Land);
        assert_eq!(player.jump_count(), 0);
        assert_eq!(
            bus.drain(),
            vec![GameEvent::PlayerLanded {
                entity_id: player.entity_id(),
            }]
        );

        let ticks = tick_until(&mut player, PlayerInput::new(), true, 30, |p| {
            p.state() == PlayerStateKind::Idle
        });
        assert!(ticks.is_some());
    }

    #[test]
    fn test_land_with_input_goes_to_move() {
        let (mut player, _bus) = spawn();
        airborne_falling(&mut player);
        player.tick(&PlayerInput::new(), true, DT);

        let ticks = tick_until(&mut player, PlayerInput::moving(1.0), true, 30, |p| {
            p.state() != PlayerStateKind::Land
        });
        assert!(ticks.is_some());
        assert_eq!(player.state(), PlayerStateKind::Move);
    }

    #[test]
    fn test_air_attack_landing_recovers_longer() {
        let (mut player, _bus) = spawn();
        airborne_falling(&mut player);

        player.tick(&PlayerInput::new().with_attack(), false, DT);
        assert_eq!(player.state(), PlayerStateKind::AirNormalAttack);

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Land);
        assert_eq!(player.last_state(), PlayerStateKind::AirNormalAttack);
        assert_eq!(player.combo_count(), 0);

        // A plain fall would have recovered by now
        for _ in 0..10 {
            player.tick(&PlayerInput::new(), true, DT);
        }
        assert_eq!(player.state(), PlayerStateKind::Land);

        let ticks = tick_until(&mut player, PlayerInput::new(), true, 30, |p| {
            p.state() == PlayerStateKind::Idle
        });
        assert!(ticks.is_some());
    }

    #[test]
    fn test_buffered_jump_fires_on_landing() {
        let (mut player, _bus) = spawn();
        let jump = PlayerInput::new().with_jump();

        player.tick(&jump, true, DT);
        player.tick(&jump, false, DT);
        tick_until(&mut player, PlayerInput::new(), false, 120, |p| {
            p.state() == PlayerStateKind::Fall
        })
        .unwrap();

        player.tick(&jump, false, DT);
        assert_eq!(player.state(), PlayerStateKind::Fall);

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Land);

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Jump);
        assert_eq!(player.jump_count(), 1);
    }

    #[test]
    fn test_jump_on_touchdown_tick_is_buffered() {
        let (mut player, _bus) = spawn();
        airborne_falling(&mut player);

        player.tick(&PlayerInput::new().with_jump(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Land);

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Jump);
        assert_eq!(player.jump_count(), 1);
    }

    #[test]
    fn test_buffered_turn_applies_before_jump() {
        let (mut player, _bus) = spawn();
        airborne_falling(&mut player);
        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.facing(), Facing::Right);

        player.tick(&PlayerInput::moving(-1.0).with_jump(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::Jump);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn test_combo_escalates_and_caps() {
        let (mut player, _bus) = spawn();
        let attack = PlayerInput::new().with_attack();
        let profile = player.data().normal_attack.clone();

        player.tick(&attack, true, DT);
        assert_eq!(player.state(), PlayerStateKind::NormalAttack);
        assert_eq!(player.combo_count(), 1);
        assert_eq!(player.current_damage(), 1);
        assert_eq!(player.animation().clip, PlayerAnimation::NormalAttack(1));

        let mut steps = vec![1];
        // 1.6s of held attack: two more windows open, the combo gap never closes
        for _ in 0..96 {
            player.tick(&attack, true, DT);
            assert_eq!(player.state(), PlayerStateKind::NormalAttack);
            assert_eq!(player.current_damage(), profile.damage_for(player.combo_count()));
            if steps.last() != Some(&player.combo_count()) {
                steps.push(player.combo_count());
            }
        }

        assert_eq!(steps, vec![1, 2, 3]);
        assert_eq!(player.current_damage(), 2);
    }

    #[test]
    fn test_combo_refresh_returns_to_idle() {
        let (mut player, _bus) = spawn();
        player.tick(&PlayerInput::new().with_attack(), true, DT);

        let ticks = tick_until(&mut player, PlayerInput::new(), true, 120, |p| {
            p.state() == PlayerStateKind::Idle
        });
        assert!(ticks.is_some());
        assert_eq!(player.combo_count(), 0);
    }

    #[test]
    fn test_attack_is_planted() {
        let (mut player, _bus) = spawn();
        player.tick(&PlayerInput::moving(1.0), true, DT);
        player.tick(&PlayerInput::moving(1.0), true, DT);
        assert_eq!(player.velocity().x, 6.0);

        player.tick(&PlayerInput::moving(1.0).with_attack(), true, DT);
        assert_eq!(player.state(), PlayerStateKind::NormalAttack);
        player.tick(&PlayerInput::moving(1.0), true, DT);
        assert_eq!(player.velocity().x, 0.0);
    }

    #[test]
    fn test_dash_attack() {
        let (mut player, _bus) = spawn();
        let input = PlayerInput::moving(1.0).with_dash().with_attack();

        player.tick(&input, true, DT);
        assert_eq!(player.state(), PlayerStateKind::DashNormalAttack);
        assert_eq!(player.current_damage(), 2);

        player.tick(&PlayerInput::new(), true, DT);
        assert_eq!(player.velocity().x, 9.0);
        assert_eq!(player.raw_horizontal_velocity(), 6.0);
    }

    #[test]
    fn test_take_damage_and_recover() {
        let (mut player, _bus) = spawn();
        let sub = player.hub().subscribe();
        player.tick(&PlayerInput::new().with_attack(), true, DT);

        player.take_damage(3, Vec3::X, WeaponKind::Claw);
        assert_eq!(player.health(), 7);
        assert_eq!(player.state(), PlayerStateKind::TakeDamage);
        assert_eq!(player.combo_count(), 0);
        assert_eq!(
            sub.drain(),
            vec![CombatNotice::TookDamage {
                amount: 3,
                contact_point: Vec3::X,
                weapon: WeaponKind::Claw,
            }]
        );

        let ticks = tick_until(&mut player, PlayerInput::new(), true, 60, |p| {
            p.state() == PlayerStateKind::Idle
        });
        assert!(ticks.is_some());
    }

    #[test]
    fn test_lethal_hit_kills() {
        let (mut player, bus) = spawn();
        let sub = player.hub().subscribe();
        bus.drain();

        player.take_damage(25, Vec3::ZERO, WeaponKind::Claw);
        assert_eq!(player.health(), 0);
        assert!(player.is_dead());
        assert!(!player.movement_enabled());
        assert_eq!(player.animation().clip, PlayerAnimation::Death);
        assert_eq!(
            bus.drain(),
            vec![GameEvent::PlayerDied {
                entity_id: player.entity_id(),
            }]
        );
        let notices = sub.drain();
        assert_eq!(notices.len(), 2);
        assert!(matches!(notices[1], CombatNotice::Died { .. }));
    }

    #[test]
    fn test_dead_player_is_terminal() {
        let (mut player, _bus) = spawn();
        player.die();
        let position = player.position();

        player.take_damage(1, Vec3::ZERO, WeaponKind::Sword);
        player.tick(&PlayerInput::moving(1.0).with_jump(), true, DT);
        player.tick(&PlayerInput::new(), false, DT);

        assert_eq!(player.state(), PlayerStateKind::Die);
        assert_eq!(player.health(), 0);
        assert_eq!(player.position(), position);
    }
}
