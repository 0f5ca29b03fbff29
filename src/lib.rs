//! Brickstorm - a brick-breaker core simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, events, boss AI)
//! - `settings`: Data-driven gameplay tuning
//! - `persistence`: Serializable snapshots for external save/load

pub mod persistence;
pub mod settings;
pub mod sim;

pub use settings::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play area dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 104.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    /// Paddle centerline height (near the bottom edge)
    pub const PADDLE_Y: f32 = 560.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Minimum ball speed (effects can't slow it below this)
    pub const BALL_MIN_SPEED: f32 = 150.0;
    /// Maximum ball speed
    pub const BALL_MAX_SPEED: f32 = 600.0;
    /// Speed boost when ball hits paddle (multiplicative)
    pub const PADDLE_BOOST: f32 = 1.04;
    /// Steepest rebound angle off the paddle edge (radians from vertical)
    pub const MAX_BOUNCE_ANGLE: f32 = 1.05;
    /// Hard cap on simultaneous balls (multi-ball respects this)
    pub const MAX_BALLS: usize = 8;
    /// Angular offset of multi-ball clones from the source direction (radians)
    pub const SPLIT_ANGLE: f32 = 0.35;

    /// Brick grid geometry
    pub const BRICK_WIDTH: f32 = 64.0;
    pub const BRICK_HEIGHT: f32 = 24.0;
    pub const BRICK_GRID_LEFT: f32 = 80.0;
    pub const BRICK_GRID_TOP: f32 = 60.0;

    /// Blast radius of an explosive brick (center-to-center)
    pub const EXPLOSION_RADIUS: f32 = 100.0;

    /// Power-up capsule size
    pub const POWER_UP_SIZE: f32 = 22.0;
    /// Pierce charges granted while the pierce effect is active
    pub const PIERCE_CHARGES: u32 = 3;

    /// Enemy / projectile defaults
    pub const ENEMY_SIZE: f32 = 36.0;
    pub const PROJECTILE_WIDTH: f32 = 6.0;
    pub const PROJECTILE_HEIGHT: f32 = 14.0;

    /// Boss geometry
    pub const BOSS_WIDTH: f32 = 120.0;
    pub const BOSS_HEIGHT: f32 = 80.0;
    /// Entry phase ends once the boss descends to this y
    pub const BOSS_TARGET_Y: f32 = 90.0;

    /// Visual particle cap
    pub const MAX_PARTICLES: usize = 256;

    /// Lives at the start of a run
    pub const START_LIVES: u8 = 3;
}

/// Rotate a vector by `angle` radians (counter-clockwise)
#[inline]
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
