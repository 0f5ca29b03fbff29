//! Per-frame collision sweep
//!
//! Arcade-style approximation: axis-aligned boxes, reflection responses.
//! For every ball, in fixed order: bounds, paddle, bricks; then paddle vs
//! power-ups and projectiles independently of ball state. Outcomes are
//! published to the world's event queue; dispatch applies the reactions
//! after the sweep, so collision always re-reads entity state next frame
//! rather than trusting a cached copy.
//!
//! Bricks are scanned in list order, not nearest-first, and at most one
//! brick is resolved per ball per frame. First match wins even if a closer
//! brick appears later in the list. Documented policy, not a bug.

use glam::Vec2;

use super::events::GameEvent;
use super::state::{Ball, Body, Paddle, World};
use crate::consts::*;

/// Axis-aligned overlap test between two bodies
#[inline]
pub fn aabb_overlap(a: &Body, b: &Body) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Circle-vs-box overlap (ball against anything rectangular)
pub fn ball_overlaps(ball: &Ball, body: &Body) -> bool {
    let closest = Vec2::new(
        ball.body.pos.x.clamp(body.left(), body.right()),
        ball.body.pos.y.clamp(body.top(), body.bottom()),
    );
    ball.body.pos.distance_squared(closest) <= ball.radius * ball.radius
}

/// Normalized offset of the ball's center from the paddle's center,
/// clamped to [-1, 1] no matter how far outside the paddle the center is.
pub fn hit_ratio(ball_center_x: f32, paddle: &Paddle) -> f32 {
    let half_width = paddle.body.size.x / 2.0;
    ((ball_center_x - paddle.body.pos.x) / half_width).clamp(-1.0, 1.0)
}

/// Run the full collision pass for one frame, publishing outcomes to the
/// world's event queue.
pub fn sweep(world: &mut World) {
    let mut pending: Vec<GameEvent> = Vec::new();

    for i in 0..world.balls.len() {
        let ball = &mut world.balls[i];
        if !ball.body.active || ball.attached {
            continue;
        }

        // (1) Bounds: side walls reverse horizontal, top reverses vertical,
        // bottom crossing loses the ball.
        if ball.body.pos.x - ball.radius <= 0.0 && ball.body.vel.x < 0.0 {
            ball.body.pos.x = ball.radius;
            ball.reverse_dir_x();
        } else if ball.body.pos.x + ball.radius >= SCREEN_WIDTH && ball.body.vel.x > 0.0 {
            ball.body.pos.x = SCREEN_WIDTH - ball.radius;
            ball.reverse_dir_x();
        }
        if ball.body.pos.y - ball.radius <= 0.0 && ball.body.vel.y < 0.0 {
            ball.body.pos.y = ball.radius;
            ball.reverse_dir_y();
        }
        if ball.body.pos.y - ball.radius > SCREEN_HEIGHT {
            // Deactivate immediately so this fires exactly once per ball
            ball.body.active = false;
            pending.push(GameEvent::BallLost { ball: ball.id });
            continue;
        }

        // (2) Paddle: rebound angle follows the hit position
        let paddle_body = world.paddle.body;
        if ball.body.vel.y > 0.0 && ball_overlaps(ball, &paddle_body) {
            let ratio = hit_ratio(ball.body.pos.x, &world.paddle);
            ball.bounce_off_paddle(ratio);
            ball.body.pos.y = paddle_body.top() - ball.radius - 0.5;
            pending.push(GameEvent::BallHitPaddle {
                ball: ball.id,
                hit_ratio: ratio,
            });
        }

        // (3) Bricks: first overlapping non-destroyed brick in list order,
        // then stop scanning for this ball.
        let ball = &mut world.balls[i];
        for brick in world.bricks.iter() {
            if brick.destroyed || !ball_overlaps(ball, &brick.body) {
                continue;
            }
            pending.push(GameEvent::BrickHit {
                brick: brick.id,
                ball: ball.id,
            });
            if ball.pierce > 0 {
                // Piercing balls pass through without deflecting
                ball.pierce -= 1;
            } else {
                ball.reverse_dir_y();
                // Nudge out of the brick so the next frame doesn't re-hit
                if ball.body.pos.y < brick.body.pos.y {
                    ball.body.pos.y = brick.body.top() - ball.radius - 0.5;
                } else {
                    ball.body.pos.y = brick.body.bottom() + ball.radius + 0.5;
                }
            }
            break;
        }

        // Enemies: direct damage, ball reflects unless piercing
        let ball = &mut world.balls[i];
        for enemy in world.enemies.iter_mut() {
            if !enemy.body.active || !ball_overlaps(ball, &enemy.body) {
                continue;
            }
            let killed = enemy.take_damage(1);
            if killed && !enemy.is_boss() {
                pending.push(GameEvent::EnemyDestroyed {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    score: enemy.score_value,
                    pos: enemy.body.pos,
                });
            }
            if ball.pierce > 0 {
                ball.pierce -= 1;
            } else {
                ball.reverse_dir_y();
            }
            break;
        }
    }

    // Paddle vs falling power-ups, independent of ball state
    let paddle_body = world.paddle.body;
    for power_up in world.power_ups.iter() {
        if power_up.taken || !power_up.body.active {
            continue;
        }
        if aabb_overlap(&power_up.body, &paddle_body) {
            pending.push(GameEvent::PowerUpCollected {
                power_up: power_up.id,
                kind: power_up.kind,
            });
        }
    }

    // Enemy projectiles vs paddle
    for projectile in world.projectiles.iter() {
        if !projectile.body.active {
            continue;
        }
        if aabb_overlap(&projectile.body, &paddle_body) {
            pending.push(GameEvent::ProjectileHitPaddle {
                projectile: projectile.id,
            });
        }
    }

    for event in pending {
        world.events.push(event);
    }
}
