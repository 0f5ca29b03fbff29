//! Power-up effects
//!
//! Timed effects (paddle expansion, speed change, piercing) live in
//! `World::effects` as [`ActiveEffect`] records and self-revert when their
//! timer expires or they are explicitly cancelled. Instantaneous effects
//! (extra life, multi-ball) finish inside `apply` and never enter the list.
//! Re-collecting an active timed effect resets its timer instead of
//! stacking a second instance.

use serde::{Deserialize, Serialize};

use super::state::World;
use crate::consts::*;
use crate::rotate_vec;

/// Power-up variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    ExpandPaddle,
    FastBall,
    SlowBall,
    ExtraLife,
    MultiBall,
    Pierce,
}

/// A running timed effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    /// Seconds until the effect reverts
    pub remaining: f32,
    /// Horizontal correction applied when expansion pushed the paddle off
    /// a wall; reversed on removal so the left edge round-trips.
    #[serde(default)]
    pub shift: f32,
}

impl ActiveEffect {
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Restart the countdown (re-collected while active)
    pub fn reset(&mut self, duration: f32) {
        self.remaining = duration;
    }
}

/// Effect duration in seconds; `None` marks an instantaneous effect
fn duration(world: &World, kind: PowerUpKind) -> Option<f32> {
    match kind {
        PowerUpKind::ExpandPaddle => Some(world.tuning.expand_duration),
        PowerUpKind::FastBall | PowerUpKind::SlowBall => Some(world.tuning.speed_duration),
        PowerUpKind::Pierce => Some(world.tuning.pierce_duration),
        PowerUpKind::ExtraLife | PowerUpKind::MultiBall => None,
    }
}

/// Apply a collected power-up to the world
pub fn apply(world: &mut World, kind: PowerUpKind) {
    log::debug!("applying power-up {kind:?}");
    match duration(world, kind) {
        None => apply_instant(world, kind),
        Some(d) => {
            // Fast and slow are mutually exclusive
            match kind {
                PowerUpKind::FastBall => remove(world, PowerUpKind::SlowBall),
                PowerUpKind::SlowBall => remove(world, PowerUpKind::FastBall),
                _ => {}
            }
            if let Some(effect) = world.effects.iter_mut().find(|e| e.kind == kind) {
                effect.reset(d);
                return;
            }
            let shift = engage(world, kind);
            world.effects.push(ActiveEffect {
                kind,
                remaining: d,
                shift,
            });
        }
    }
}

/// Advance timers; expired effects revert and drop
pub fn update(world: &mut World, dt: f32) {
    for effect in world.effects.iter_mut() {
        effect.remaining -= dt;
    }
    let expired: Vec<PowerUpKind> = world
        .effects
        .iter()
        .filter(|e| e.is_expired())
        .map(|e| e.kind)
        .collect();
    for kind in expired {
        remove(world, kind);
    }
}

/// Explicitly cancel a timed effect, reverting its side effects.
/// No-op if the effect is not active.
pub fn remove(world: &mut World, kind: PowerUpKind) {
    let Some(idx) = world.effects.iter().position(|e| e.kind == kind) else {
        return;
    };
    let effect = world.effects.remove(idx);
    disengage(world, &effect);
    log::debug!("power-up {kind:?} reverted");
}

/// Instantaneous effects: done inside apply, expired immediately
fn apply_instant(world: &mut World, kind: PowerUpKind) {
    match kind {
        PowerUpKind::ExtraLife => {
            world.lives = world.lives.saturating_add(1);
        }
        PowerUpKind::MultiBall => split_balls(world),
        _ => unreachable!("timed effect routed to apply_instant"),
    }
}

/// Start a timed effect's side effects. Returns the paddle shift so
/// expansion can round-trip.
fn engage(world: &mut World, kind: PowerUpKind) -> f32 {
    match kind {
        PowerUpKind::ExpandPaddle => {
            let paddle = &mut world.paddle;
            let old_x = paddle.body.pos.x;
            paddle.body.size.x = paddle.base_width * world.tuning.expand_factor;
            paddle.refresh_bounds();
            // Wider paddle may not fit at its old center; remember the
            // correction so removal can undo it.
            paddle.body.pos.x = old_x.clamp(paddle.min_x, paddle.max_x);
            paddle.body.pos.x - old_x
        }
        PowerUpKind::FastBall => {
            let factor = world.tuning.fast_factor;
            scale_ball_speeds(world, factor);
            0.0
        }
        PowerUpKind::SlowBall => {
            let factor = world.tuning.slow_factor;
            scale_ball_speeds(world, factor);
            0.0
        }
        PowerUpKind::Pierce => {
            for ball in world.balls.iter_mut().filter(|b| !b.attached) {
                ball.pierce = PIERCE_CHARGES;
            }
            0.0
        }
        _ => 0.0,
    }
}

/// Revert a timed effect's side effects
fn disengage(world: &mut World, effect: &ActiveEffect) {
    match effect.kind {
        PowerUpKind::ExpandPaddle => {
            let paddle = &mut world.paddle;
            paddle.body.size.x = paddle.base_width;
            paddle.refresh_bounds();
            paddle.body.pos.x =
                (paddle.body.pos.x - effect.shift).clamp(paddle.min_x, paddle.max_x);
        }
        PowerUpKind::FastBall | PowerUpKind::SlowBall => {
            restore_ball_speeds(world);
        }
        PowerUpKind::Pierce => {
            for ball in world.balls.iter_mut() {
                ball.pierce = 0;
            }
        }
        _ => {}
    }
}

/// Scale every ball's speed off its base speed. Attached balls are scaled
/// too, so a ball served mid-effect launches at the boosted speed.
fn scale_ball_speeds(world: &mut World, factor: f32) {
    for ball in world.balls.iter_mut() {
        let speed = ball.base_speed * factor;
        ball.set_speed(speed);
    }
}

/// Put every ball back on its base speed. Inverse scaling would drift on
/// balls the clamp caught, or ones served after the effect engaged.
fn restore_ball_speeds(world: &mut World) {
    for ball in world.balls.iter_mut() {
        let speed = ball.base_speed;
        ball.set_speed(speed);
    }
}

/// Multi-ball split: clone each free ball twice (one clockwise, one
/// counter-clockwise offset) up to the global ball cap. Clones copy the
/// source's speed at the moment of the split.
fn split_balls(world: &mut World) {
    let sources: Vec<_> = world
        .balls
        .iter()
        .filter(|b| !b.attached && b.body.active)
        .cloned()
        .collect();
    for source in sources {
        for offset in [SPLIT_ANGLE, -SPLIT_ANGLE] {
            if world.balls.len() >= MAX_BALLS {
                return;
            }
            let id = world.next_entity_id();
            let mut clone = source.clone();
            clone.id = id;
            clone.body.vel = rotate_vec(source.body.vel, offset);
            clone.speed = source.speed;
            clone.clamp_speed();
            world.balls.push(clone);
        }
    }
}
