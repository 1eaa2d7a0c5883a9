//! Static per-type character data.
//!
//! Records are loaded once by the host and treated as read-only by the
//! characters built from them. Every record is validated before use; an
//! invalid record is a fatal configuration error.

use serde::{Deserialize, Serialize};

use duskblade_common::Vec3;

use crate::error::{GameplayError, GameplayResult};

/// Damage and movement tuning for one attack variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Damage per combo step; steps past the end reuse the last tier
    pub damage_tiers: Vec<i32>,
    /// Horizontal speed modifier while attacking (0 = planted)
    pub speed_modifier: f32,
    /// Gravity multiplier while attacking in the air
    pub gravity_scale: f32,
}

impl AttackProfile {
    /// Damage dealt by the given 1-based combo step.
    #[must_use]
    pub fn damage_for(&self, combo_step: u32) -> i32 {
        if combo_step == 0 {
            return 0;
        }
        let index = (combo_step as usize - 1).min(self.damage_tiers.len().saturating_sub(1));
        self.damage_tiers.get(index).copied().unwrap_or(0)
    }
}

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerData {
    /// Maximum health
    pub max_health: i32,
    /// Ground move speed in units per second
    pub move_speed: f32,
    /// Horizontal speed modifier while airborne
    pub air_speed_modifier: f32,
    /// Horizontal speed modifier during landing recovery
    pub land_speed_modifier: f32,
    /// Initial upward velocity of a jump
    pub jump_velocity: f32,
    /// Gravity acceleration (downward)
    pub gravity: f32,
    /// Maximum downward speed
    pub max_fall_speed: f32,
    /// Vertical velocity held while grounded (keeps contact with slopes)
    pub grounded_vertical_velocity: f32,
    /// Jumps allowed before touching the ground again
    pub max_jump_count: u32,
    /// How long a jump pressed in the air stays buffered
    pub jump_buffer_time: f32,
    /// Landing recovery after a plain fall
    pub recovery_fall: f32,
    /// Landing recovery after an air attack
    pub recovery_air_normal_attack: f32,
    /// Hit-stun duration
    pub take_damage_recovery: f32,
    /// Minimum time between combo steps
    pub attack_delay: f32,
    /// Time after the last step before the combo resets
    pub combo_gap: f32,
    /// Combo steps allowed
    pub max_combo_count: u32,
    /// Grounded attack
    pub normal_attack: AttackProfile,
    /// Airborne attack
    pub air_normal_attack: AttackProfile,
    /// Attack out of a dash
    pub dash_normal_attack: AttackProfile,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            max_health: 10,
            move_speed: 6.0,
            air_speed_modifier: 0.8,
            land_speed_modifier: 0.5,
            jump_velocity: 12.0,
            gravity: 30.0,
            max_fall_speed: 20.0,
            grounded_vertical_velocity: -2.0,
            max_jump_count: 2,
            jump_buffer_time: 0.15,
            recovery_fall: 0.1,
            recovery_air_normal_attack: 0.35,
            take_damage_recovery: 0.4,
            attack_delay: 0.5,
            combo_gap: 0.8,
            max_combo_count: 3,
            normal_attack: AttackProfile {
                damage_tiers: vec![1, 1, 2],
                speed_modifier: 0.0,
                gravity_scale: 1.0,
            },
            air_normal_attack: AttackProfile {
                damage_tiers: vec![1, 1, 2],
                speed_modifier: 0.5,
                gravity_scale: 0.4,
            },
            dash_normal_attack: AttackProfile {
                damage_tiers: vec![2, 2, 3],
                speed_modifier: 1.5,
                gravity_scale: 1.0,
            },
        }
    }
}

impl PlayerData {
    /// Check the record for unusable values.
    pub fn validate(&self) -> GameplayResult<()> {
        let fail = |field, reason: &str| {
            Err(GameplayError::InvalidData {
                record: "player",
                field,
                reason: reason.to_owned(),
            })
        };

        if self.max_health <= 0 {
            return fail("max_health", "must be positive");
        }
        if self.max_combo_count == 0 {
            return fail("max_combo_count", "must be at least 1");
        }
        if self.max_jump_count == 0 {
            return fail("max_jump_count", "must be at least 1");
        }
        for (field, value) in [
            ("move_speed", self.move_speed),
            ("gravity", self.gravity),
            ("max_fall_speed", self.max_fall_speed),
            ("attack_delay", self.attack_delay),
            ("combo_gap", self.combo_gap),
            ("recovery_fall", self.recovery_fall),
            ("recovery_air_normal_attack", self.recovery_air_normal_attack),
            ("take_damage_recovery", self.take_damage_recovery),
            ("jump_buffer_time", self.jump_buffer_time),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(field, "must be a non-negative number");
            }
        }
        for (field, profile) in [
            ("normal_attack", &self.normal_attack),
            ("air_normal_attack", &self.air_normal_attack),
            ("dash_normal_attack", &self.dash_normal_attack),
        ] {
            if profile.damage_tiers.is_empty() {
                return fail(field, "needs at least one damage tier");
            }
        }
        Ok(())
    }
}

/// Enemy temperament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Only fights back
    #[default]
    Neutral,
    /// Attacks on sight
    Hostile,
}

/// Enemy tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyData {
    /// Temperament
    pub disposition: Disposition,
    /// Maximum health
    pub max_health: i32,
    /// Maximum stamina
    pub max_stamina: i32,
    /// Stamina regained per second
    pub stamina_regen_rate: f32,
    /// Accumulated damage that triggers a stagger
    pub stagger_threshold: i32,
    /// Delay between losing the target and dropping aggro
    pub unaggro_delay: f32,
    /// Shortest corpse cleanup delay
    pub corpse_delay_min: f32,
    /// Longest corpse cleanup delay
    pub corpse_delay_max: f32,
    /// Offset from the enemy position where the corpse-clear effect plays
    pub poof_offset: Vec3,
    /// Closest wander destination
    pub min_wander_range: f32,
    /// Farthest wander destination
    pub max_wander_range: f32,
    /// Speed while wandering
    pub wander_speed: f32,
    /// Speed while chasing
    pub aggro_speed: f32,
    /// Sensor radius while resting
    pub rest_alert_radius: f32,
    /// Sensor radius while wandering
    pub wander_alert_radius: f32,
    /// Sensor radius while aggroed
    pub aggro_alert_radius: f32,
}

impl Default for EnemyData {
    fn default() -> Self {
        Self {
            disposition: Disposition::Neutral,
            max_health: 10,
            max_stamina: 10,
            stamina_regen_rate: 1.5,
            stagger_threshold: 5,
            unaggro_delay: 3.0,
            corpse_delay_min: 4.5,
            corpse_delay_max: 6.0,
            poof_offset: Vec3::new(0.0, 1.0, 0.0),
            min_wander_range: 2.0,
            max_wander_range: 6.0,
            wander_speed: 1.5,
            aggro_speed: 4.0,
            rest_alert_radius: 3.0,
            wander_alert_radius: 5.0,
            aggro_alert_radius: 9.0,
        }
    }
}

impl EnemyData {
    /// Check the record for unusable values.
    pub fn validate(&self) -> GameplayResult<()> {
        let fail = |field, reason: &str| {
            Err(GameplayError::InvalidData {
                record: "enemy",
                field,
                reason: reason.to_owned(),
            })
        };

        if self.max_health <= 0 {
            return fail("max_health", "must be positive");
        }
        if self.max_stamina < 0 {
            return fail("max_stamina", "must not be negative");
        }
        if self.stagger_threshold <= 0 {
            return fail("stagger_threshold", "must be positive");
        }
        if self.corpse_delay_min > self.corpse_delay_max {
            return fail("corpse_delay_min", "must not exceed corpse_delay_max");
        }
        if self.min_wander_range > self.max_wander_range {
            return fail("min_wander_range", "must not exceed max_wander_range");
        }
        for (field, value) in [
            ("stamina_regen_rate", self.stamina_regen_rate),
            ("unaggro_delay", self.unaggro_delay),
            ("corpse_delay_min", self.corpse_delay_min),
            ("rest_alert_radius", self.rest_alert_radius),
            ("wander_alert_radius", self.wander_alert_radius),
            ("aggro_alert_radius", self.aggro_alert_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(field, "must be a non-negative number");
            }
        }
        Ok(())
    }
}
