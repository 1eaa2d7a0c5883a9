//! Reactions to being hit: TakeDamage and Die.

use super::state::{PlayerAnimation, PlayerContext, PlayerStateKind, RecoverySubstate};
use crate::input::PlayerInput;

pub(super) fn enter_take_damage(ctx: &mut PlayerContext) {
    ctx.set_velocity_x(0.0, 1.0);
    ctx.recovery.remaining = ctx.data.take_damage_recovery;
    ctx.play(PlayerAnimation::Hit);
}

pub(super) fn exit_take_damage(ctx: &mut PlayerContext) {
    ctx.recovery = RecoverySubstate::default();
}

pub(super) fn take_damage_logic(ctx: &mut PlayerContext, _input: &PlayerInput) -> Option<PlayerStateKind> {
    if ctx.grounded {
        ctx.set_velocity_y(ctx.data.grounded_vertical_velocity);
    } else {
        ctx.apply_gravity(1.0);
    }

    ctx.recovery.remaining -= ctx.dt;
    (ctx.recovery.remaining <= 0.0).then_some(PlayerStateKind::Idle)
}

pub(super) fn enter_die(ctx: &mut PlayerContext) {
    ctx.movement_enabled = false;
    ctx.set_velocity_x(0.0, 1.0);
    ctx.set_velocity_y(0.0);
    ctx.current_damage = 0;
    ctx.play(PlayerAnimation::Death);
}

pub(super) fn die_logic(_ctx: &mut PlayerContext, _input: &PlayerInput) -> Option<PlayerStateKind> {
    None
}
