//! Deterministic arcade simulation core
//!
//! Everything here is plain data plus free functions over a single
//! [`World`] context. The driver is [`tick`]: call it once per fixed
//! timestep with this frame's [`TickInput`].

pub mod boss;
pub mod collision;
pub mod events;
pub mod factory;
pub mod level;
pub mod movement;
pub mod powerup;
pub mod state;
pub mod tick;

pub use boss::BossPhase;
pub use events::{EventQueue, GameEvent};
pub use factory::SpawnError;
pub use movement::MovementKind;
pub use powerup::{ActiveEffect, PowerUpKind};
pub use state::{
    Ball, Body, Brick, BrickKind, Enemy, EnemyKind, GamePhase, Paddle, Particle, PowerUp,
    Projectile, World,
};
pub use tick::{TickInput, tick};
