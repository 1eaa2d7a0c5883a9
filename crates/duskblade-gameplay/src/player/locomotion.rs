//! Grounded locomotion: Idle and Move.

use super::state::{PlayerAnimation, PlayerContext, PlayerStateKind};
use crate::input::PlayerInput;

/// Transitions every grounded, non-attacking state checks first.
fn grounded_exits(ctx: &PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if !ctx.grounded {
        return Some(PlayerStateKind::Fall);
    }
    if input.jump && ctx.can_jump() {
        return Some(PlayerStateKind::Jump);
    }
    if input.attack {
        return Some(if input.dash && input.has_movement() {
            PlayerStateKind::DashNormalAttack
        } else {
            PlayerStateKind::NormalAttack
        });
    }
    None
}

pub(super) fn enter_idle(ctx: &mut PlayerContext) {
    ctx.set_velocity_x(0.0, 1.0);
    ctx.set_velocity_y(ctx.data.grounded_vertical_velocity);
    ctx.play(PlayerAnimation::Idle);
}

pub(super) fn idle_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if let Some(next) = grounded_exits(ctx, input) {
        return Some(next);
    }
    input.has_movement().then_some(PlayerStateKind::Move)
}

pub(super) fn enter_move(ctx: &mut PlayerContext) {
    ctx.play(PlayerAnimation::Move);
}

pub(super) fn move_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if let Some(next) = grounded_exits(ctx, input) {
        return Some(next);
    }
    if !input.has_movement() {
        return Some(PlayerStateKind::Idle);
    }
    ctx.set_velocity_x(input.move_axis * ctx.data.move_speed, 1.0);
    ctx.face_input(input);
    None
}

/// Keep grounded characters pressed against the floor.
pub(super) fn ground_physics(ctx: &mut PlayerContext) {
    if ctx.grounded {
        ctx.set_velocity_y(ctx.data.grounded_vertical_velocity);
    }
}
