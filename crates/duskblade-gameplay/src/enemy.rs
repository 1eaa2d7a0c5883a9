//! Enemy behavior controller.
//!
//! The controller owns an enemy's vitals and aggro state and publishes them
//! as planner facts. An external GOAP planner reads those facts to choose
//! actions; actions call back into the controller (`stamina_used`,
//! `apply_sensor_mode`, `set_current_damage`).
//!
//! Lifecycle follows object pooling: a controller is built once, then
//! [`activate`](EnemyController::activate)d and
//! [`deactivate`](EnemyController::deactivate)d any number of times.

use tracing::{debug, info, trace};

use duskblade_common::{confine_to_plane, EntityId, Vec3};

use crate::combat::{
    Attacker, CombatHub, CombatNotice, Damageable, Subscription, TargetRef, WeaponKind,
};
use crate::data::{Disposition, EnemyData};
use crate::error::GameplayResult;
use crate::events::{EventPublisher, GameEvent};
use crate::facts::{FactStore, FactValue, CURRENT_STAMINA, IS_ALERT, IS_DEAD};
use crate::timer::{TimerHandle, Timers};

/// Payloads of the enemy's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnemyTimer {
    /// Drop aggro after the target left the sensor
    Unaggro,
    /// Remove the corpse
    CorpseClear,
}

/// Which sensor radius the enemy is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SensorMode {
    /// Resting, short radius
    #[default]
    Rest,
    /// Wandering
    Wander,
    /// Chasing a target
    Aggro,
}

/// Animation the enemy asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyAnimation {
    /// Locomotion blend (idle/walk/run)
    #[default]
    Locomotion,
    /// Stagger flinch
    Stagger,
    /// Death
    Death,
}

/// The current aggro target and our subscription to its notices.
#[derive(Debug)]
struct AggroTarget {
    entity_id: EntityId,
    subscription: Subscription,
}

/// Enemy vitals, aggro, and planner facts.
#[derive(Debug)]
pub struct EnemyController<F: FactStore> {
    entity_id: EntityId,
    data: EnemyData,
    facts: F,
    publisher: EventPublisher,
    hub: CombatHub,
    position: Vec3,

    // Vitals
    health: i32,
    stamina: f32,
    stagger_threshold: i32,
    stagger_count: u32,
    current_damage: i32,

    // Lifecycle
    active: bool,
    dead: bool,
    hit_detection: bool,
    corpse_cleared: bool,
    animation: EnemyAnimation,

    // Perception
    sensor_mode: SensorMode,
    alert_radius: f32,
    target: Option<AggroTarget>,

    timers: Timers<EnemyTimer>,
    unaggro: Option<TimerHandle>,
    corpse_clear: Option<TimerHandle>,
    rng: fastrand::Rng,
}

impl<F: FactStore> EnemyController<F> {
    /// Build an inactive enemy. Call [`activate`](Self::activate) to spawn it.
    pub fn new(
        position: Vec3,
        data: EnemyData,
        facts: F,
        publisher: EventPublisher,
    ) -> GameplayResult<Self> {
        data.validate()?;
        let alert_radius = data.rest_alert_radius;
        let stagger_threshold = data.stagger_threshold;

        Ok(Self {
            entity_id: EntityId::new(),
            data,
            facts,
            publisher,
            hub: CombatHub::new(),
            position: confine_to_plane(position),
            health: 0,
            stamina: 0.0,
            stagger_threshold,
            stagger_count: 0,
            current_damage: 0,
            active: false,
            dead: false,
            hit_detection: false,
            corpse_cleared: false,
            animation: EnemyAnimation::Locomotion,
            sensor_mode: SensorMode::Rest,
            alert_radius,
            target: None,
            timers: Timers::new(),
            unaggro: None,
            corpse_clear: None,
            rng: fastrand::Rng::new(),
        })
    }

    /// Use a seeded generator for the corpse cleanup delay.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Spawn or respawn the enemy.
    ///
    /// Health and stamina are restored to max and the stamina fact is
    /// rewritten to match. Timers left over from a previous life are cancelled.
    pub fn activate(&mut self) {
        self.timers.cancel_slot(&mut self.corpse_clear);
        self.timers.cancel_slot(&mut self.unaggro);
        self.active = true;
        self.dead = false;
        self.hit_detection = true;
        self.corpse_cleared = false;
        self.animation = EnemyAnimation::Locomotion;

        self.health = self.data.max_health;
        self.stamina = self.data.max_stamina as f32;
        self.facts
            .set_fact(CURRENT_STAMINA, FactValue::Float(self.stamina));

        if self.facts.has_fact(IS_DEAD) {
            self.facts.remove_fact(IS_DEAD);
        }
        self.stagger_threshold = self.data.stagger_threshold;
        self.apply_sensor_mode(SensorMode::Rest);

        self.publisher.publish(GameEvent::EnemySpawned {
            entity_id: self.entity_id,
            max_health: self.data.max_health,
            max_stamina: self.data.max_stamina,
        });
        info!(entity = %self.entity_id, health = self.health, "enemy activated");
    }

    /// Return the enemy to the pool.
    ///
    /// Drops the aggro subscription and cancels every pending timer.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.end_aggro();
        self.timers.clear();
        self.unaggro = None;
        self.corpse_clear = None;
        self.active = false;
        self.hit_detection = false;
        debug!(entity = %self.entity_id, "enemy deactivated");
    }

    /// Advance timers, react to target notices, and regenerate stamina.
    pub fn tick(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        for timer in self.timers.advance(dt) {
            match timer {
                EnemyTimer::Unaggro => {
                    self.unaggro = None;
                    self.end_aggro();
                },
                EnemyTimer::CorpseClear => {
                    self.corpse_clear = None;
                    self.clear_corpse();
                },
            }
        }

        let target_died = self.target.as_ref().is_some_and(|target| {
            target.subscription.drain().iter().any(|notice| {
                matches!(notice, CombatNotice::Died { actor, .. } if *actor == target.entity_id)
            })
        });
        if target_died {
            debug!(entity = %self.entity_id, "aggro target died");
            self.end_aggro();
        }

        self.regenerate_stamina(dt);
    }

    fn regenerate_stamina(&mut self, dt: f32) {
        let max_stamina = self.data.max_stamina as f32;
        if self.stamina >= max_stamina {
            return;
        }
        self.stamina = (self.stamina + self.data.stamina_regen_rate * dt).clamp(0.0, max_stamina);
        self.facts
            .set_fact(CURRENT_STAMINA, FactValue::Float(self.stamina));
    }

    fn clear_corpse(&mut self) {
        self.corpse_cleared = true;
        let position = self.position + self.data.poof_offset;
        info!(entity = %self.entity_id, "corpse cleared");
        self.hub.publish(CombatNotice::CorpseCleared {
            actor: self.entity_id,
            position,
        });
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Deduct stamina spent by an action and publish it immediately.
    pub fn stamina_used(&mut self, amount: f32) {
        let max_stamina = self.data.max_stamina as f32;
        self.stamina = (self.stamina - amount).clamp(0.0, max_stamina);
        self.facts
            .set_fact(CURRENT_STAMINA, FactValue::Float(self.stamina));
        trace!(entity = %self.entity_id, stamina = self.stamina, "stamina used");
    }

    /// Flinch from accumulated damage.
    ///
    /// Health and aggro are untouched. A dead enemy keeps its death pose.
    pub fn stagger(&mut self) {
        self.stagger_count += 1;
        self.stagger_threshold = self.data.stagger_threshold;
        if !self.dead {
            self.animation = EnemyAnimation::Stagger;
        }
        self.publisher.publish(GameEvent::EnemyStaggered {
            entity_id: self.entity_id,
            stagger_count: self.stagger_count,
        });
        info!(entity = %self.entity_id, count = self.stagger_count, "enemy staggered");
    }

    /// Return to locomotion after a stagger animation ends.
    pub fn recover_from_stagger(&mut self) {
        if self.animation == EnemyAnimation::Stagger {
            self.animation = EnemyAnimation::Locomotion;
        }
    }

    // ========================================================================
    // Perception
    // ========================================================================

    /// A target entered the sensor.
    ///
    /// The first target starts aggro; any later call only cancels a pending
    /// un-aggro.
    pub fn set_player_on(&mut self, target: &TargetRef) {
        if !self.active {
            return;
        }
        if self.target.is_none() {
            self.target = Some(AggroTarget {
                entity_id: target.entity_id,
                subscription: target.hub.subscribe(),
            });
            self.facts.set_fact(IS_ALERT, FactValue::PRESENT);
            info!(entity = %self.entity_id, target = %target.entity_id, "aggro started");
        } else if self.timers.cancel_slot(&mut self.unaggro) {
            debug!(entity = %self.entity_id, "target re-entered, un-aggro cancelled");
        }
    }

    /// A target left the sensor. Aggro ends after the un-aggro delay unless
    /// the target comes back first.
    pub fn set_player_off(&mut self, target: &TargetRef) {
        let tracked = self
            .target
            .as_ref()
            .is_some_and(|current| current.entity_id == target.entity_id);
        if !tracked {
            return;
        }
        let delay = self.data.unaggro_delay;
        self.timers
            .replace(&mut self.unaggro, "unaggro", delay, EnemyTimer::Unaggro);
        debug!(entity = %self.entity_id, delay, "un-aggro scheduled");
    }

    fn end_aggro(&mut self) {
        self.timers.cancel_slot(&mut self.unaggro);
        if let Some(target) = self.target.take() {
            self.facts.remove_fact(IS_ALERT);
            info!(entity = %self.entity_id, target = %target.entity_id, "aggro ended");
        }
    }

    /// Override the sensor radius.
    pub fn set_alert_radius(&mut self, radius: f32) {
        self.alert_radius = radius.max(0.0);
    }

    /// Select the sensor radius configured for `mode`.
    pub fn apply_sensor_mode(&mut self, mode: SensorMode) {
        self.sensor_mode = mode;
        self.set_alert_radius(match mode {
            SensorMode::Rest => self.data.rest_alert_radius,
            SensorMode::Wander => self.data.wander_alert_radius,
            SensorMode::Aggro => self.data.aggro_alert_radius,
        });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Check if the enemy is aggroed on a target.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.target.is_some()
    }

    /// Current aggro target.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.target.as_ref().map(|t| t.entity_id)
    }

    /// Check if an un-aggro is pending.
    #[must_use]
    pub fn unaggro_pending(&self) -> bool {
        self.unaggro.is_some_and(|h| self.timers.is_running(h))
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.data.max_health
    }

    /// Current stamina.
    #[must_use]
    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Maximum stamina.
    #[must_use]
    pub fn max_stamina(&self) -> i32 {
        self.data.max_stamina
    }

    /// Damage left before the next stagger.
    #[must_use]
    pub fn stagger_threshold(&self) -> i32 {
        self.stagger_threshold
    }

    /// Staggers taken so far.
    #[must_use]
    pub fn stagger_count(&self) -> u32 {
        self.stagger_count
    }

    /// Check if the enemy is in the world.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check if hits can land.
    #[must_use]
    pub fn hit_detection_enabled(&self) -> bool {
        self.hit_detection
    }

    /// Check if the corpse has been removed.
    #[must_use]
    pub fn corpse_cleared(&self) -> bool {
        self.corpse_cleared
    }

    /// Animation to play.
    #[must_use]
    pub fn animation(&self) -> EnemyAnimation {
        self.animation
    }

    /// Active sensor mode.
    #[must_use]
    pub fn sensor_mode(&self) -> SensorMode {
        self.sensor_mode
    }

    /// Current sensor radius.
    #[must_use]
    pub fn alert_radius(&self) -> f32 {
        self.alert_radius
    }

    /// Check if the enemy attacks on sight.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.data.disposition == Disposition::Hostile
    }

    /// Enemy tuning.
    #[must_use]
    pub fn data(&self) -> &EnemyData {
        &self.data
    }

    /// Planner facts.
    #[must_use]
    pub fn facts(&self) -> &F {
        &self.facts
    }

    /// Planner facts, for planner-side writes.
    pub fn facts_mut(&mut self) -> &mut F {
        &mut self.facts
    }

    /// Move the enemy (navigation is host-driven).
    pub fn set_position(&mut self, position: Vec3) {
        self.position = confine_to_plane(position);
    }
}

impl<F: FactStore> Damageable for EnemyController<F> {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn hub(&self) -> &CombatHub {
        &self.hub
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    /// Health and stagger threshold both drop by `amount`. Death and stagger
    /// are checked independently, so one hit may trigger both.
    fn take_damage(&mut self, amount: i32, contact_point: Vec3, weapon: WeaponKind) {
        if !self.hit_detection {
            trace!(entity = %self.entity_id, "hit ignored, hit detection off");
            return;
        }
        let remaining = self.health - amount;
        self.stagger_threshold -= amount;
        self.health = remaining.clamp(0, self.data.max_health);

        self.hub.publish(CombatNotice::TookDamage {
            amount,
            contact_point,
            weapon,
        });
        debug!(entity = %self.entity_id, amount, health = remaining, "enemy took damage");

        if remaining <= 0 {
            self.die();
        }
        if self.stagger_threshold <= 0 {
            self.stagger();
        }

        self.publisher.publish(GameEvent::EnemyTookDamage {
            entity_id: self.entity_id,
            damage: amount,
        });
    }

    fn die(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.health = 0;
        self.hit_detection = false;
        self.animation = EnemyAnimation::Death;

        self.publisher.publish(GameEvent::EnemyDied {
            entity_id: self.entity_id,
        });
        self.hub.publish(CombatNotice::Died {
            actor: self.entity_id,
            position: self.position,
        });
        self.facts.set_fact(IS_DEAD, FactValue::PRESENT);

        let (min, max) = (self.data.corpse_delay_min, self.data.corpse_delay_max);
        let delay = min + (max - min) * self.rng.f32();
        self.timers
            .replace(&mut self.corpse_clear, "corpse_clear", delay, EnemyTimer::CorpseClear);
        info!(entity = %self.entity_id, corpse_delay = delay, "enemy died");
    }
}

impl<F: FactStore> Attacker for EnemyController<F> {
    fn set_current_damage(&mut self, amount: i32) {
        self.current_damage = amount;
    }

    fn current_damage(&self) -> i32 {
        self.current_damage
    }
}
