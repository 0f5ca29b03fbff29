//! Data-driven movement strategies for non-player entities
//!
//! Each enemy carries a [`MovementKind`] value; one step function advances
//! any of them. Swapping behavior is an assignment, not an object swap.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Body;

/// A movement policy plus its per-instance state (timers, direction)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementKind {
    /// Straight-line descent
    Descend { speed: f32 },
    /// Bounded left-right patrol with reflecting boundaries.
    /// `dir` is +1 or -1.
    Patrol {
        min_x: f32,
        max_x: f32,
        speed: f32,
        dir: f32,
    },
    /// Holds position
    Static,
    /// Waits, then bursts in a random direction
    DashWait {
        wait: f32,
        dash_duration: f32,
        speed: f32,
        timer: f32,
        dashing: bool,
        dir: Vec2,
    },
}

/// Advance one entity's movement by one step
pub fn step(body: &mut Body, movement: &mut MovementKind, dt: f32, rng: &mut Pcg32) {
    match movement {
        MovementKind::Descend { speed } => {
            body.vel = Vec2::new(0.0, *speed);
            body.integrate(dt);
        }

        MovementKind::Patrol {
            min_x,
            max_x,
            speed,
            dir,
        } => {
            body.vel = Vec2::new(*speed * *dir, 0.0);
            body.integrate(dt);
            // Reflect at the patrol bounds
            if body.pos.x <= *min_x {
                body.pos.x = *min_x;
                *dir = 1.0;
            } else if body.pos.x >= *max_x {
                body.pos.x = *max_x;
                *dir = -1.0;
            }
        }

        MovementKind::Static => {
            body.vel = Vec2::ZERO;
        }

        MovementKind::DashWait {
            wait,
            dash_duration,
            speed,
            timer,
            dashing,
            dir,
        } => {
            *timer += dt;
            if *dashing {
                body.vel = *dir * *speed;
                body.integrate(dt);
                if *timer >= *dash_duration {
                    *dashing = false;
                    *timer = 0.0;
                }
            } else {
                body.vel = Vec2::ZERO;
                if *timer >= *wait {
                    let angle = rng.random_range(0.0..std::f32::consts::TAU);
                    *dir = Vec2::new(angle.cos(), angle.sin());
                    *dashing = true;
                    *timer = 0.0;
                }
            }
        }
    }
}
