//! Combo attacks: grounded, airborne, and dash variants.
//!
//! Entering an attack starts step 1 of the combo. Each step schedules two
//! timers: `attack_delay` gates the next step, `combo_gap` ends the combo.
//! An attack press after the delay and before the gap starts the next step
//! and restarts both timers. When the gap timer fires the combo resets and
//! the player returns to Idle.

use tracing::debug;

use super::state::{
    AttackSubstate, PlayerAnimation, PlayerContext, PlayerStateKind, PlayerTimer,
};
use crate::input::PlayerInput;

/// Start the next combo step of `kind`.
fn start_step(ctx: &mut PlayerContext, kind: PlayerStateKind) {
    let (delay, gap) = (ctx.data.attack_delay, ctx.data.combo_gap);
    ctx.timers.replace(
        &mut ctx.attack.attack_ready,
        "attack_delay",
        delay,
        PlayerTimer::AttackReady,
    );
    ctx.timers.replace(
        &mut ctx.attack.combo_refresh,
        "combo_refresh",
        gap,
        PlayerTimer::ComboRefresh,
    );
    ctx.attack.ready = false;
    ctx.attack.combo = (ctx.attack.combo + 1).min(ctx.data.max_combo_count);

    let step = ctx.attack.combo;
    ctx.current_damage = ctx.attack_profile(kind).damage_for(step);
    ctx.play(match kind {
        PlayerStateKind::AirNormalAttack => PlayerAnimation::AirNormalAttack(step),
        PlayerStateKind::DashNormalAttack => PlayerAnimation::DashNormalAttack(step),
        _ => PlayerAnimation::NormalAttack(step),
    });
    debug!(
        entity = %ctx.entity_id,
        attack = kind.name(),
        step,
        damage = ctx.current_damage,
        "combo step"
    );
}

/// Timer handling and combo chaining shared by every variant.
fn combo_logic(
    ctx: &mut PlayerContext,
    input: &PlayerInput,
    kind: PlayerStateKind,
) -> Option<PlayerStateKind> {
    if ctx.timer_fired(PlayerTimer::AttackReady) {
        ctx.attack.ready = true;
    }
    if ctx.timer_fired(PlayerTimer::ComboRefresh) {
        ctx.attack.combo = 0;
        return Some(PlayerStateKind::Idle);
    }
    if ctx.attack.ready && input.attack && ctx.attack.combo < ctx.data.max_combo_count {
        start_step(ctx, kind);
    }
    None
}

pub(super) fn enter_normal(ctx: &mut PlayerContext) {
    ctx.set_velocity_x(0.0, 1.0);
    start_step(ctx, PlayerStateKind::NormalAttack);
}

pub(super) fn enter_air(ctx: &mut PlayerContext) {
    start_step(ctx, PlayerStateKind::AirNormalAttack);
}

pub(super) fn enter_dash(ctx: &mut PlayerContext) {
    start_step(ctx, PlayerStateKind::DashNormalAttack);
}

pub(super) fn exit_attack(ctx: &mut PlayerContext) {
    ctx.timers.cancel_slot(&mut ctx.attack.attack_ready);
    ctx.timers.cancel_slot(&mut ctx.attack.combo_refresh);
    ctx.attack = AttackSubstate::default();
    ctx.current_damage = 0;
}

pub(super) fn normal_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if !ctx.grounded {
        return Some(PlayerStateKind::Fall);
    }
    let planted = ctx.data.normal_attack.speed_modifier;
    ctx.set_velocity_x(ctx.facing.sign() * ctx.data.move_speed, planted);
    combo_logic(ctx, input, PlayerStateKind::NormalAttack)
}

pub(super) fn air_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if ctx.grounded && ctx.velocity.y <= 0.0 {
        return Some(PlayerStateKind::Land);
    }
    let profile = &ctx.data.air_normal_attack;
    let (modifier, gravity_scale) = (profile.speed_modifier, profile.gravity_scale);
    ctx.set_velocity_x(input.move_axis * ctx.data.move_speed, modifier);
    ctx.apply_gravity(gravity_scale);
    combo_logic(ctx, input, PlayerStateKind::AirNormalAttack)
}

pub(super) fn dash_logic(ctx: &mut PlayerContext, input: &PlayerInput) -> Option<PlayerStateKind> {
    if !ctx.grounded {
        return Some(PlayerStateKind::Fall);
    }
    let lunge = ctx.data.dash_normal_attack.speed_modifier;
    ctx.set_velocity_x(ctx.facing.sign() * ctx.data.move_speed, lunge);
    combo_logic(ctx, input, PlayerStateKind::DashNormalAttack)
}
