//! Fixed timestep simulation tick
//!
//! One `tick` advances the whole world by one step: paddle intent, entity
//! motion, the boss machine, the collision sweep, event dispatch, effect
//! timers, the external boss death check, and finally the cull pass.
//! Nothing blocks, nothing is awaited; a frame either runs to completion
//! or is not invoked.

use super::boss;
use super::collision;
use super::events::{self, GameEvent};
use super::movement;
use super::powerup;
use super::state::{GamePhase, World};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Horizontal paddle intent in [-1, 1], already resolved by the
    /// external input adapter
    pub paddle_dir: f32,
    /// Launch attached balls (click/tap/space)
    pub launch: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if world.phase == GamePhase::GameOver {
        return;
    }
    world.time_ticks += 1;

    // Paddle intent, clamped to the movement bounds
    world.paddle.body.vel.x = input.paddle_dir.clamp(-1.0, 1.0) * world.paddle.speed;
    world.paddle.advance(dt);

    match world.phase {
        GamePhase::Serve => {
            let paddle = world.paddle.clone();
            for ball in world.balls.iter_mut() {
                ball.update_attached(&paddle);
            }
            update_particles(world, dt);

            if input.launch {
                for ball in world.balls.iter_mut() {
                    ball.launch();
                }
                world.phase = GamePhase::Playing;
                log::debug!("serve: {} ball(s) launched", world.balls.len());
            }
        }

        GamePhase::Playing => {
            advance_entities(world, dt);

            // Boss phase machine (transitions, attacks, minions)
            boss::update(world, dt);

            // Detect overlaps, publish outcomes
            collision::sweep(world);

            // Apply all reactions queued this frame
            events::drain(world);

            // Timed power-up effects count down and self-revert
            powerup::update(world, dt);

            // External health check owns the transition into Dying
            boss::check_death(world);

            // Lazy deletion: inactive entities leave their collections here
            world.cull();

            end_of_frame_bookkeeping(world);
        }

        GamePhase::GameOver => {}
    }
}

/// Integrate every live entity's motion for one step
fn advance_entities(world: &mut World, dt: f32) {
    let paddle = world.paddle.clone();
    for ball in world.balls.iter_mut() {
        if ball.attached {
            ball.update_attached(&paddle);
        } else {
            ball.clamp_speed();
            ball.body.integrate(dt);
        }
    }

    let heal_delay = world.tuning.heal_delay;
    for brick in world.bricks.iter_mut() {
        brick.heal_tick(dt, heal_delay);
    }

    // Enemies step their movement strategies; ones that leave the play
    // area are done for. The boss never despawns this way.
    let mut rng = world.rng.clone();
    for enemy in world.enemies.iter_mut() {
        if !enemy.body.active {
            continue;
        }
        movement::step(&mut enemy.body, &mut enemy.movement, dt, &mut rng);
        if !enemy.entered_screen && enemy.body.top() >= 0.0 {
            enemy.entered_screen = true;
        }
        if enemy.is_boss() {
            continue;
        }
        let gone = enemy.body.top() > SCREEN_HEIGHT
            || enemy.body.right() < 0.0
            || enemy.body.left() > SCREEN_WIDTH
            || (enemy.entered_screen && enemy.body.bottom() < 0.0);
        if gone {
            enemy.body.active = false;
        }
    }
    world.rng = rng;

    for projectile in world.projectiles.iter_mut() {
        projectile.body.integrate(dt);
        let b = &projectile.body;
        if b.top() > SCREEN_HEIGHT || b.bottom() < 0.0 || b.right() < 0.0 || b.left() > SCREEN_WIDTH
        {
            projectile.body.active = false;
        }
    }

    for power_up in world.power_ups.iter_mut() {
        power_up.body.integrate(dt);
        if power_up.body.top() > SCREEN_HEIGHT {
            power_up.body.active = false;
        }
    }

    update_particles(world, dt);
}

fn update_particles(world: &mut World, dt: f32) {
    for particle in world.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel *= 0.98;
        particle.life -= dt * 1.5;
        particle.size *= 0.995;
    }
    world.particles.retain(|p| p.life > 0.0);
}

/// Ball-loss respawn and level-clear detection
fn end_of_frame_bookkeeping(world: &mut World) {
    if world.phase == GamePhase::GameOver {
        return;
    }

    if world.balls.is_empty() {
        world.events.push(GameEvent::LifeLost);
        events::drain(world);
        if world.phase != GamePhase::GameOver {
            world.spawn_ball_attached();
            world.phase = GamePhase::Serve;
        }
        return;
    }

    if !world.level_cleared && world.is_level_complete() {
        world.level_cleared = true;
        world.events.push(GameEvent::LevelCleared {
            level: world.level_index,
        });
        events::drain(world);
    }
}
