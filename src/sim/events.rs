//! Frame event queue and dispatch
//!
//! Collision outcomes are decoupled from their reactions (scoring, damage,
//! destruction, drops, life loss) through an explicit queue owned by the
//! [`World`]: producers push events during the sweep and entity updates,
//! and `drain` applies all reactions once per tick, in FIFO order.
//! Reactions may push follow-up events (explosion chains); those are
//! processed within the same drain. Handlers are plain match arms and
//! cannot fail, so there is no per-handler isolation to worry about.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::factory;
use super::powerup::{self, PowerUpKind};
use super::state::{BrickKind, DamageOutcome, EnemyKind, GamePhase, Particle, World};
use crate::consts::*;

/// An immutable record of something that happened during the frame.
/// Entities are referenced by ID; dispatch re-reads live state, never a
/// cached copy.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A ball struck a non-destroyed brick
    BrickHit { brick: u32, ball: u32 },
    /// A brick's durability reached zero (or policy destroyed it)
    BrickDestroyed {
        brick: u32,
        kind: BrickKind,
        pos: Vec2,
    },
    /// An explosive brick died; damage everything in the blast radius
    ExplosionTriggered { center: Vec2 },
    /// A ball crossed the bottom edge
    BallLost { ball: u32 },
    /// A ball rebounded off the paddle
    BallHitPaddle { ball: u32, hit_ratio: f32 },
    /// The paddle caught a falling capsule
    PowerUpCollected { power_up: u32, kind: PowerUpKind },
    /// A destroyed brick dropped a capsule
    PowerUpSpawned { power_up: u32, kind: PowerUpKind },
    /// An enemy's health reached zero
    EnemyDestroyed {
        enemy: u32,
        kind: EnemyKind,
        score: u64,
        pos: Vec2,
    },
    /// An enemy projectile reached the paddle
    ProjectileHitPaddle { projectile: u32 },
    /// The boss moved to a new phase
    BossPhaseChanged { name: &'static str },
    /// All balls gone, or the paddle was shot
    LifeLost,
    /// Every breakable brick and enemy is gone
    LevelCleared { level: u32 },
}

/// FIFO queue of this frame's events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    queue: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event; consumed by the next drain
    pub fn push(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Unbounded event cascades indicate a logic bug; bail out rather than
/// spin the frame forever.
const DRAIN_LIMIT: usize = 4096;

/// Drain the world's event queue, applying every reaction.
/// Draining with no pending events is a no-op.
pub fn drain(world: &mut World) {
    let mut handled = 0;
    while let Some(event) = world.events.pop() {
        handle(world, event);
        handled += 1;
        if handled >= DRAIN_LIMIT {
            log::warn!("event drain hit limit ({DRAIN_LIMIT}); dropping remainder");
            while world.events.pop().is_some() {}
            break;
        }
    }
}

/// Score awarded for destroying a brick of the given kind
pub fn brick_score(kind: BrickKind) -> u64 {
    match kind {
        BrickKind::Normal => 10,
        BrickKind::Hard => 25,
        BrickKind::Explosive => 50,
        BrickKind::Healing => 20,
        BrickKind::Unbreakable => 0,
    }
}

fn particle_color(kind: BrickKind) -> u32 {
    match kind {
        BrickKind::Normal => 0,
        BrickKind::Hard => 1,
        BrickKind::Explosive => 2,
        BrickKind::Healing => 3,
        BrickKind::Unbreakable => 4,
    }
}

fn handle(world: &mut World, event: GameEvent) {
    match event {
        GameEvent::BrickHit { brick, ball: _ } => {
            let Some(b) = world.bricks.iter_mut().find(|b| b.id == brick) else {
                return;
            };
            match b.take_damage() {
                DamageOutcome::Destroyed => {
                    let (kind, pos) = (b.kind, b.body.pos);
                    world
                        .events
                        .push(GameEvent::BrickDestroyed { brick, kind, pos });
                }
                DamageOutcome::Damaged | DamageOutcome::Ignored => {}
            }
        }

        GameEvent::BrickDestroyed { brick: _, kind, pos } => {
            world.score += brick_score(kind);
            spawn_debris(world, pos, particle_color(kind));

            if kind == BrickKind::Explosive {
                world
                    .events
                    .push(GameEvent::ExplosionTriggered { center: pos });
            }

            // Drop roll
            if world.rng.random::<f32>() < world.tuning.drop_chance {
                let kind = factory::roll_power_up(&mut world.rng);
                let id = world.next_entity_id();
                let power_up =
                    factory::spawn_power_up(id, kind, pos, world.tuning.power_up_fall_speed);
                world.power_ups.push(power_up);
                world
                    .events
                    .push(GameEvent::PowerUpSpawned { power_up: id, kind });
            }
        }

        GameEvent::ExplosionTriggered { center } => {
            // Damage every brick within the blast radius. Already-destroyed
            // bricks ignore the hit, which bounds chained explosions.
            let mut casualties = Vec::new();
            for b in world.bricks.iter_mut() {
                if b.destroyed || b.body.pos.distance(center) > EXPLOSION_RADIUS {
                    continue;
                }
                if b.take_damage() == DamageOutcome::Destroyed {
                    casualties.push((b.id, b.kind, b.body.pos));
                }
            }
            for (brick, kind, pos) in casualties {
                world
                    .events
                    .push(GameEvent::BrickDestroyed { brick, kind, pos });
            }
        }

        GameEvent::BallLost { ball } => {
            if let Some(b) = world.balls.iter_mut().find(|b| b.id == ball) {
                b.body.active = false;
            }
            log::debug!("ball {ball} lost");
        }

        GameEvent::BallHitPaddle { ball, hit_ratio } => {
            // Rebound itself is applied by the collision sweep; this event
            // exists for collaborators (audio, stats).
            log::trace!("ball {ball} hit paddle at {hit_ratio:.2}");
        }

        GameEvent::PowerUpCollected { power_up, kind } => {
            if let Some(p) = world.power_ups.iter_mut().find(|p| p.id == power_up) {
                p.taken = true;
                p.body.active = false;
            }
            powerup::apply(world, kind);
        }

        GameEvent::PowerUpSpawned { power_up, kind } => {
            log::debug!("power-up {power_up} spawned: {kind:?}");
        }

        GameEvent::EnemyDestroyed {
            enemy,
            kind,
            score,
            pos,
        } => {
            world.score += score;
            spawn_debris(world, pos, 5);
            log::debug!("enemy {enemy} ({kind:?}) destroyed");
        }

        GameEvent::ProjectileHitPaddle { projectile } => {
            if let Some(p) = world.projectiles.iter_mut().find(|p| p.id == projectile) {
                p.body.active = false;
            }
            world.events.push(GameEvent::LifeLost);
        }

        GameEvent::BossPhaseChanged { name } => {
            log::info!("boss phase: {name}");
        }

        GameEvent::LifeLost => {
            world.lives = world.lives.saturating_sub(1);
            log::info!("life lost, {} remaining", world.lives);
            if world.lives == 0 {
                world.phase = GamePhase::GameOver;
            }
        }

        GameEvent::LevelCleared { level } => {
            log::info!("level {level} cleared, score {}", world.score);
        }
    }
}

/// Debris burst at a destruction site
fn spawn_debris(world: &mut World, pos: Vec2, color: u32) {
    for _ in 0..12 {
        let angle = world.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = world.rng.random_range(60.0..220.0);
        let size = world.rng.random_range(2.0..6.0);
        world.push_particle(Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            color,
            life: 1.0,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::state::{Body, Brick, HealState};

    fn brick_at(id: u32, kind: BrickKind, pos: Vec2) -> Brick {
        Brick {
            id,
            body: Body::new(pos, Vec2::new(BRICK_WIDTH, BRICK_HEIGHT)),
            kind,
            hp: match kind {
                BrickKind::Hard => 2,
                _ => 1,
            },
            destroyed: false,
            heal: HealState::Visible,
        }
    }

    #[test]
    fn test_drain_empty_is_noop() {
        let mut world = World::new(1, Tuning::default());
        drain(&mut world);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_brick_hit_applies_damage_and_scores_on_destroy() {
        let mut world = World::new(1, Tuning::default());
        world.tuning.drop_chance = 0.0;
        world.bricks.push(brick_at(100, BrickKind::Normal, Vec2::new(200.0, 100.0)));

        world.events.push(GameEvent::BrickHit { brick: 100, ball: 1 });
        drain(&mut world);

        assert!(world.bricks[0].destroyed);
        assert_eq!(world.score, brick_score(BrickKind::Normal));
    }

    #[test]
    fn test_hard_brick_takes_two_hits() {
        let mut world = World::new(1, Tuning::default());
        world.tuning.drop_chance = 0.0;
        world.bricks.push(brick_at(100, BrickKind::Hard, Vec2::new(200.0, 100.0)));

        world.events.push(GameEvent::BrickHit { brick: 100, ball: 1 });
        drain(&mut world);
        assert!(!world.bricks[0].destroyed);
        assert_eq!(world.score, 0);

        world.events.push(GameEvent::BrickHit { brick: 100, ball: 1 });
        drain(&mut world);
        assert!(world.bricks[0].destroyed);
        assert_eq!(world.score, brick_score(BrickKind::Hard));
    }

    #[test]
    fn test_no_duplicate_destroyed_event_for_dead_brick() {
        let mut world = World::new(1, Tuning::default());
        world.tuning.drop_chance = 0.0;
        world.bricks.push(brick_at(100, BrickKind::Normal, Vec2::new(200.0, 100.0)));

        world.events.push(GameEvent::BrickHit { brick: 100, ball: 1 });
        world.events.push(GameEvent::BrickHit { brick: 100, ball: 2 });
        drain(&mut world);

        // Second hit was ignored: scored exactly once
        assert_eq!(world.score, brick_score(BrickKind::Normal));
        assert_eq!(world.bricks[0].hp, 0);
    }

    #[test]
    fn test_explosion_chains_through_neighbors() {
        let mut world = World::new(1, Tuning::default());
        world.tuning.drop_chance = 0.0;
        // Two explosives within blast range of each other, one normal
        // brick in range of the second only.
        world
            .bricks
            .push(brick_at(1, BrickKind::Explosive, Vec2::new(100.0, 100.0)));
        world
            .bricks
            .push(brick_at(2, BrickKind::Explosive, Vec2::new(180.0, 100.0)));
        world
            .bricks
            .push(brick_at(3, BrickKind::Normal, Vec2::new(260.0, 100.0)));

        world.events.push(GameEvent::BrickHit { brick: 1, ball: 1 });
        drain(&mut world);

        assert!(world.bricks.iter().all(|b| b.destroyed));
        let expected = brick_score(BrickKind::Explosive) * 2 + brick_score(BrickKind::Normal);
        assert_eq!(world.score, expected);
    }

    #[test]
    fn test_explosion_spares_unbreakable() {
        let mut world = World::new(1, Tuning::default());
        world.tuning.drop_chance = 0.0;
        world
            .bricks
            .push(brick_at(1, BrickKind::Explosive, Vec2::new(100.0, 100.0)));
        world
            .bricks
            .push(brick_at(2, BrickKind::Unbreakable, Vec2::new(150.0, 100.0)));

        world.events.push(GameEvent::BrickHit { brick: 1, ball: 1 });
        drain(&mut world);

        assert!(world.bricks[0].destroyed);
        assert!(!world.bricks[1].destroyed);
    }

    #[test]
    fn test_life_lost_reaches_game_over() {
        let mut world = World::new(1, Tuning::default());
        world.lives = 1;
        world.events.push(GameEvent::LifeLost);
        drain(&mut world);
        assert_eq!(world.lives, 0);
        assert_eq!(world.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_projectile_hit_costs_a_life() {
        let mut world = World::new(1, Tuning::default());
        let lives = world.lives;
        world.events.push(GameEvent::ProjectileHitPaddle { projectile: 42 });
        drain(&mut world);
        assert_eq!(world.lives, lives - 1);
    }
}
