//! Airborne states: Jump, Fall, and the Land recovery that ends them.

use duskblade_common::{is_standstill, Facing};
use tracing::debug;

use super::state::{LandSubstate, PlayerAnimation, PlayerContext, PlayerStateKind};
use crate::events::GameEvent;
use crate::input::PlayerInput;

/// Horizontal air control shared by Jump and Fall.
fn steer(ctx: &mut PlayerContext, input: &PlayerInput) {
    ctx.set_velocity_x(
        input.move_axis * ctx.data.move_speed,
        ctx.data.air_speed_modifier,
    );
    ctx.face_input(input);
}

/// Jump again if jumps remain; otherwise hold the press for Land.
fn air_jump(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if !input.jump {
        return None;
    }
    if ctx.can_jump() {
        return Some(PlayerStateKind::Jump);
    }
    ctx.jump_buffer = ctx.data.jump_buffer_time;
    None
}

pub(super) fn enter_jump(ctx: &mut PlayerContext) {
    ctx.set_velocity_y(ctx.data.jump_velocity);
    ctx.jump_count += 1;
    ctx.jump_buffer = 0.0;
    ctx.play(PlayerAnimation::Jump);
}

pub(super) fn jump_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if let Some(next) = air_jump(ctx, input) {
        return Some(next);
    }
    if input.attack {
        return Some(PlayerStateKind::AirNormalAttack);
    }
    steer(ctx, input);
    ctx.apply_gravity(1.0);
    (ctx.velocity.y <= 0.0).then_some(PlayerStateKind::Fall)
}

pub(super) fn enter_fall(ctx: &mut PlayerContext) {
    ctx.play(PlayerAnimation::Fall);
}

pub(super) fn fall_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if ctx.grounded {
        // A press on the touchdown tick is held for Land
        if input.jump {
            ctx.jump_buffer = ctx.data.jump_buffer_time;
        }
        return Some(PlayerStateKind::Land);
    }
    if let Some(next) = air_jump(ctx, input) {
        return Some(next);
    }
    if input.attack {
        return Some(PlayerStateKind::AirNormalAttack);
    }
    steer(ctx, input);
    ctx.apply_gravity(1.0);
    None
}

/// Cap descent at terminal speed.
pub(super) fn air_physics(ctx: &mut PlayerContext) {
    ctx.velocity.y = ctx.velocity.y.max(-ctx.data.max_fall_speed);
}

pub(super) fn enter_land(ctx: &mut PlayerContext) {
    ctx.publisher.publish(GameEvent::PlayerLanded {
        entity_id: ctx.entity_id,
    });
    ctx.jump_count = 0;
    ctx.set_velocity_y(ctx.data.grounded_vertical_velocity);
    ctx.play(PlayerAnimation::Land);

    ctx.land.remaining = if ctx.last_state == PlayerStateKind::AirNormalAttack {
        ctx.data.recovery_air_normal_attack
    } else {
        ctx.data.recovery_fall
    };
    ctx.land.pending_facing = ctx.facing;
}

pub(super) fn exit_land(ctx: &mut PlayerContext) {
    ctx.land = LandSubstate::default();
}

pub(super) fn land_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if !ctx.grounded {
        return Some(PlayerStateKind::Fall);
    }

    ctx.set_velocity_x(
        input.move_axis * ctx.data.move_speed,
        ctx.data.land_speed_modifier,
    );
    // Facing changes wait until recovery ends or a buffered jump fires
    if let Some(wanted) = Facing::from_axis(input.move_axis) {
        ctx.land.turning = wanted != ctx.facing;
        ctx.land.pending_facing = wanted;
    }

    if ctx.land.remaining > 0.0 {
        if input.jump || ctx.jump_buffer > 0.0 {
            if ctx.land.turning {
                ctx.land.turning = false;
                ctx.facing = ctx.land.pending_facing;
            }
            debug!(entity = %ctx.entity_id, "buffered jump out of landing");
            return Some(PlayerStateKind::Jump);
        }
        ctx.land.remaining -= ctx.dt;
        return None;
    }

    if is_standstill(ctx.velocity.x) {
        Some(PlayerStateKind::Idle)
    } else {
        Some(PlayerStateKind::Move)
    }
}
