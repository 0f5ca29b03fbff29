//! Serializable snapshots for external save/load
//!
//! A [`Snapshot`] is a frame-boundary copy of everything gameplay-relevant,
//! stored as per-entity records rather than raw entity structs. Restore
//! rebuilds each entity through the same factory functions used for fresh
//! spawns and then overwrites position, velocity, and health, so a restored
//! brick or enemy is indistinguishable from a freshly spawned one.
//!
//! Transient state is deliberately absent: the frame event queue is empty
//! between ticks and particles are decorative, so neither is captured. The
//! RNG is restored from the run seed; a restored run replays the seed's
//! stream from the start rather than resuming mid-stream.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Tuning;
use crate::sim::boss::BossPhase;
use crate::sim::factory;
use crate::sim::movement::MovementKind;
use crate::sim::powerup::{ActiveEffect, PowerUpKind};
use crate::sim::state::{
    Ball, BrickKind, EnemyKind, GamePhase, HealState, Paddle, World,
};

/// Bumped whenever the snapshot layout changes incompatibly
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallRecord {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub speed: f32,
    pub base_speed: f32,
    pub attached: bool,
    pub pierce: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrickRecord {
    pub id: u32,
    pub kind: BrickKind,
    pub pos: Vec2,
    pub hp: i32,
    pub destroyed: bool,
    #[serde(default)]
    pub heal: HealState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: i32,
    pub entered_screen: bool,
    pub movement: MovementKind,
    #[serde(default)]
    pub phase: Option<BossPhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileRecord {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpRecord {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
}

/// A complete, serializable copy of one frame-boundary game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub level_index: u32,
    pub score: u64,
    pub lives: u8,
    pub time_ticks: u64,
    pub paddle: Paddle,
    pub balls: Vec<BallRecord>,
    pub bricks: Vec<BrickRecord>,
    pub enemies: Vec<EnemyRecord>,
    pub projectiles: Vec<ProjectileRecord>,
    pub power_ups: Vec<PowerUpRecord>,
    pub effects: Vec<ActiveEffect>,
    pub level_cleared: bool,
}

impl Snapshot {
    /// Capture the current world. Call between ticks, never mid-tick.
    pub fn capture(world: &World) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            seed: world.seed,
            tuning: world.tuning.clone(),
            phase: world.phase,
            level_index: world.level_index,
            score: world.score,
            lives: world.lives,
            time_ticks: world.time_ticks,
            paddle: world.paddle.clone(),
            balls: world
                .balls
                .iter()
                .map(|b| BallRecord {
                    id: b.id,
                    pos: b.body.pos,
                    vel: b.body.vel,
                    speed: b.speed,
                    base_speed: b.base_speed,
                    attached: b.attached,
                    pierce: b.pierce,
                })
                .collect(),
            bricks: world
                .bricks
                .iter()
                .map(|b| BrickRecord {
                    id: b.id,
                    kind: b.kind,
                    pos: b.body.pos,
                    hp: b.hp,
                    destroyed: b.destroyed,
                    heal: b.heal,
                })
                .collect(),
            enemies: world
                .enemies
                .iter()
                .map(|e| EnemyRecord {
                    id: e.id,
                    kind: e.kind,
                    pos: e.body.pos,
                    vel: e.body.vel,
                    hp: e.hp,
                    entered_screen: e.entered_screen,
                    movement: e.movement,
                    phase: e.phase,
                })
                .collect(),
            projectiles: world
                .projectiles
                .iter()
                .map(|p| ProjectileRecord {
                    id: p.id,
                    pos: p.body.pos,
                    vel: p.body.vel,
                })
                .collect(),
            power_ups: world
                .power_ups
                .iter()
                .map(|p| PowerUpRecord {
                    id: p.id,
                    kind: p.kind,
                    pos: p.body.pos,
                })
                .collect(),
            effects: world.effects.clone(),
            level_cleared: world.level_cleared,
        }
    }

    /// Rebuild a playable world: every entity goes through the same factory
    /// as a fresh spawn, then position/velocity/health are overwritten from
    /// the records.
    pub fn restore(self) -> World {
        let mut world = World::new(self.seed, self.tuning);
        world.phase = self.phase;
        world.level_index = self.level_index;
        world.score = self.score;
        world.lives = self.lives;
        world.time_ticks = self.time_ticks;
        world.paddle = self.paddle;
        world.level_cleared = self.level_cleared;
        world.effects = self.effects;

        world.balls = self
            .balls
            .iter()
            .map(|r| {
                let mut ball = Ball::new(r.id, r.speed);
                ball.body.pos = r.pos;
                ball.body.vel = r.vel;
                ball.base_speed = r.base_speed;
                ball.attached = r.attached;
                ball.pierce = r.pierce;
                ball
            })
            .collect();

        world.bricks = self
            .bricks
            .iter()
            .map(|r| {
                let mut brick = factory::spawn_brick(r.kind, r.pos).with_id(r.id);
                brick.hp = r.hp;
                brick.destroyed = r.destroyed;
                brick.body.active = !r.destroyed;
                brick.heal = r.heal;
                brick
            })
            .collect();

        world.enemies = self
            .enemies
            .iter()
            .map(|r| {
                let mut enemy = if r.kind == EnemyKind::Boss {
                    factory::spawn_boss(r.id, &world.tuning)
                } else {
                    factory::spawn_enemy(r.id, r.kind, r.pos, &world.tuning)
                };
                enemy.body.pos = r.pos;
                enemy.body.vel = r.vel;
                enemy.hp = r.hp;
                enemy.entered_screen = r.entered_screen;
                enemy.movement = r.movement;
                enemy.phase = r.phase;
                enemy
            })
            .collect();

        world.projectiles = self
            .projectiles
            .iter()
            .map(|r| factory::spawn_projectile(r.id, r.pos, r.vel))
            .collect();

        world.power_ups = self
            .power_ups
            .iter()
            .map(|r| {
                factory::spawn_power_up(r.id, r.kind, r.pos, world.tuning.power_up_fall_speed)
            })
            .collect();

        // Resume ID allocation past every captured entity
        let max_id = world
            .balls
            .iter()
            .map(|b| b.id)
            .chain(world.bricks.iter().map(|b| b.id))
            .chain(world.enemies.iter().map(|e| e.id))
            .chain(world.projectiles.iter().map(|p| p.id))
            .chain(world.power_ups.iter().map(|p| p.id))
            .max()
            .unwrap_or(0);
        world.reset_id_allocator(max_id + 1);

        log::info!(
            "snapshot restored: level {}, score {}, {} lives",
            world.level_index,
            world.score,
            world.lives
        );
        world
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
