//! Player state tags, shared state context, and the handler table.
//!
//! Every state is a tag in [`PlayerStateKind`]. Its behavior lives in one
//! row of [`STATE_TABLE`]: `enter`, `exit`, a `logic` step that may request a
//! transition, and a `physics` step that constrains velocity before the
//! owning player integrates it. Fields shared between states live in
//! [`PlayerContext`]; per-state transient fields live in the substate
//! structs and are reset when their state exits.

use serde::{Deserialize, Serialize};

use duskblade_common::{EntityId, Facing, Vec3};

use super::{airborne, attack, locomotion, reaction};
use crate::data::{AttackProfile, PlayerData};
use crate::error::{GameplayError, GameplayResult};
use crate::events::EventPublisher;
use crate::input::PlayerInput;
use crate::timer::{TimerHandle, Timers};

/// Closed set of player states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerStateKind {
    /// Standing still
    #[default]
    Idle,
    /// Running along the ground
    Move,
    /// Rising after a jump impulse
    Jump,
    /// Descending
    Fall,
    /// Landing recovery
    Land,
    /// Grounded combo attack
    NormalAttack,
    /// Airborne combo attack
    AirNormalAttack,
    /// Attack out of a dash
    DashNormalAttack,
    /// Hit stun
    TakeDamage,
    /// Dead (terminal)
    Die,
}

impl PlayerStateKind {
    /// Every state, in table order.
    pub const ALL: [Self; 10] = [
        Self::Idle,
        Self::Move,
        Self::Jump,
        Self::Fall,
        Self::Land,
        Self::NormalAttack,
        Self::AirNormalAttack,
        Self::DashNormalAttack,
        Self::TakeDamage,
        Self::Die,
    ];

    /// State name for logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Move => "Move",
            Self::Jump => "Jump",
            Self::Fall => "Fall",
            Self::Land => "Land",
            Self::NormalAttack => "NormalAttack",
            Self::AirNormalAttack => "AirNormalAttack",
            Self::DashNormalAttack => "DashNormalAttack",
            Self::TakeDamage => "TakeDamage",
            Self::Die => "Die",
        }
    }

    /// Check if this is one of the combo attack states.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(
            self,
            Self::NormalAttack | Self::AirNormalAttack | Self::DashNormalAttack
        )
    }

    /// Check if the state only makes sense off the ground.
    #[must_use]
    pub const fn is_airborne(self) -> bool {
        matches!(self, Self::Jump | Self::Fall | Self::AirNormalAttack)
    }
}

/// Payloads of the player's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerTimer {
    /// The next combo step may start
    AttackReady,
    /// The combo window closed
    ComboRefresh,
}

/// Animation clips the player asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerAnimation {
    /// Idle loop
    #[default]
    Idle,
    /// Run loop
    Move,
    /// Jump takeoff
    Jump,
    /// Fall loop
    Fall,
    /// Landing
    Land,
    /// Grounded combo step (1-based)
    NormalAttack(u32),
    /// Air combo step (1-based)
    AirNormalAttack(u32),
    /// Dash attack step (1-based)
    DashNormalAttack(u32),
    /// Hit reaction
    Hit,
    /// Death
    Death,
}

/// Last clip requested and how many times any clip was (re)started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationCue {
    /// Clip to play
    pub clip: PlayerAnimation,
    /// Play requests so far; a restart of the same clip bumps this
    pub plays: u32,
}

/// Landing recovery substate.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct LandSubstate {
    pub(super) remaining: f32,
    pub(super) turning: bool,
    pub(super) pending_facing: Facing,
}

/// Combo attack substate.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct AttackSubstate {
    pub(super) combo: u32,
    pub(super) ready: bool,
    pub(super) attack_ready: Option<TimerHandle>,
    pub(super) combo_refresh: Option<TimerHandle>,
}

/// Hit-stun substate.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct RecoverySubstate {
    pub(super) remaining: f32,
}

/// Fields shared by every state.
#[derive(Debug)]
pub(crate) struct PlayerContext {
    pub(super) entity_id: EntityId,
    pub(super) data: PlayerData,
    pub(super) publisher: EventPublisher,
    pub(super) velocity: Vec3,
    pub(super) raw_horizontal: f32,
    pub(super) facing: Facing,
    pub(super) jump_count: u32,
    pub(super) jump_buffer: f32,
    pub(super) grounded: bool,
    pub(super) movement_enabled: bool,
    pub(super) current_damage: i32,
    pub(super) dt: f32,
    pub(super) last_state: PlayerStateKind,
    pub(super) animation: AnimationCue,
    pub(super) timers: Timers<PlayerTimer>,
    pub(super) fired: Vec<PlayerTimer>,
    pub(super) land: LandSubstate,
    pub(super) attack: AttackSubstate,
    pub(super) recovery: RecoverySubstate,
}

impl PlayerContext {
    pub(super) fn new(entity_id: EntityId, data: PlayerData, publisher: EventPublisher) -> Self {
        Self {
            entity_id,
            data,
            publisher,
            velocity: Vec3::ZERO,
            raw_horizontal: 0.0,
            facing: Facing::Right,
            jump_count: 0,
            jump_buffer: 0.0,
            grounded: true,
            movement_enabled: true,
            current_damage: 0,
            dt: 0.0,
            last_state: PlayerStateKind::Idle,
            animation: AnimationCue::default(),
            timers: Timers::new(),
            fired: Vec::new(),
            land: LandSubstate::default(),
            attack: AttackSubstate::default(),
            recovery: RecoverySubstate::default(),
        }
    }

    /// Set horizontal velocity from an unmodified target speed.
    pub(super) fn set_velocity_x(&mut self, horizontal: f32, speed_modifier: f32) {
        self.raw_horizontal = horizontal;
        self.velocity.x = horizontal * speed_modifier;
    }

    pub(super) fn set_velocity_y(&mut self, vertical: f32) {
        self.velocity.y = vertical;
    }

    /// Accumulate gravity, capped at the terminal fall speed.
    pub(super) fn apply_gravity(&mut self, scale: f32) {
        let vy = self.velocity.y - self.data.gravity * scale * self.dt;
        self.velocity.y = vy.max(-self.data.max_fall_speed);
    }

    /// Face along the input axis, if there is one.
    pub(super) fn face_input(&mut self, input: &PlayerInput) {
        if let Some(facing) = Facing::from_axis(input.move_axis) {
            self.facing = facing;
        }
    }

    pub(super) fn can_jump(&self) -> bool {
        self.jump_count < self.data.max_jump_count
    }

    pub(super) fn timer_fired(&self, timer: PlayerTimer) -> bool {
        self.fired.contains(&timer)
    }

    pub(super) fn play(&mut self, clip: PlayerAnimation) {
        self.animation.clip = clip;
        self.animation.plays += 1;
    }

    pub(super) fn attack_profile(&self, kind: PlayerStateKind) -> &AttackProfile {
        match kind {
            PlayerStateKind::AirNormalAttack => &self.data.air_normal_attack,
            PlayerStateKind::DashNormalAttack => &self.data.dash_normal_attack,
            _ => &self.data.normal_attack,
        }
    }
}

/// Handlers for one state.
pub(crate) struct StateHandlers {
    pub(crate) kind: PlayerStateKind,
    pub(crate) enter: fn(&mut PlayerContext),
    pub(crate) exit: fn(&mut PlayerContext),
    pub(crate) logic: fn(&mut PlayerContext, &PlayerInput) -> Option<PlayerStateKind>,
    pub(crate) physics: fn(&mut PlayerContext),
}

fn no_op(_: &mut PlayerContext) {}

/// Dispatch table, indexed by `PlayerStateKind as usize`.
pub(crate) static STATE_TABLE: [StateHandlers; 10] = [
    StateHandlers {
        kind: PlayerStateKind::Idle,
        enter: locomotion::enter_idle,
        exit: no_op,
        logic: locomotion::idle_logic,
        physics: locomotion::ground_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::Move,
        enter: locomotion::enter_move,
        exit: no_op,
        logic: locomotion::move_logic,
        physics: locomotion::ground_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::Jump,
        enter: airborne::enter_jump,
        exit: no_op,
        logic: airborne::jump_logic,
        physics: airborne::air_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::Fall,
        enter: airborne::enter_fall,
        exit: no_op,
        logic: airborne::fall_logic,
        physics: airborne::air_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::Land,
        enter: airborne::enter_land,
        exit: airborne::exit_land,
        logic: airborne::land_logic,
        physics: locomotion::ground_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::NormalAttack,
        enter: attack::enter_normal,
        exit: attack::exit_attack,
        logic: attack::normal_logic,
        physics: locomotion::ground_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::AirNormalAttack,
        enter: attack::enter_air,
        exit: attack::exit_attack,
        logic: attack::air_logic,
        physics: airborne::air_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::DashNormalAttack,
        enter: attack::enter_dash,
        exit: attack::exit_attack,
        logic: attack::dash_logic,
        physics: locomotion::ground_physics,
    },
    StateHandlers {
        kind: PlayerStateKind::TakeDamage,
        enter: reaction::enter_take_damage,
        exit: reaction::exit_take_damage,
        logic: reaction::take_damage_logic,
        physics: no_op,
    },
    StateHandlers {
        kind: PlayerStateKind::Die,
        enter: reaction::enter_die,
        exit: no_op,
        logic: reaction::die_logic,
        physics: no_op,
    },
];

/// Handlers for a state.
pub(crate) fn handlers(kind: PlayerStateKind) -> &'static StateHandlers {
    &STATE_TABLE[kind as usize]
}

/// Check that every state is served by its own table slot.
pub(crate) fn validate_state_table() -> GameplayResult<()> {
    for (slot, (expected, row)) in PlayerStateKind::ALL
        .iter()
        .zip(STATE_TABLE.iter())
        .enumerate()
    {
        if row.kind != *expected || *expected as usize != slot {
            return Err(GameplayError::StateTableMismatch {
                slot,
                expected: expected.name(),
                found: row.kind.name(),
            });
        }
    }
    Ok(())
}
