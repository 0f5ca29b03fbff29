//! Game state and core simulation types
//!
//! Entities share a common movable [`Body`] instead of an inheritance
//! hierarchy; per-kind behavior hangs off tag enums. The [`World`] is the
//! single simulation context: it owns every live collection, the RNG, the
//! frame event queue, and tuning. No globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::BossPhase;
use super::events::EventQueue;
use super::movement::MovementKind;
use super::powerup::ActiveEffect;
use crate::consts::*;
use crate::settings::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball attached to paddle, waiting for launch input
    Serve,
    /// Active gameplay
    Playing,
    /// Run ended
    GameOver,
}

/// Shared movable state embedded in every entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    /// Center position
    pub pos: Vec2,
    /// Width/height of the bounding box
    pub size: Vec2,
    pub vel: Vec2,
    /// Inactive bodies are never collided against and are culled at
    /// end of frame.
    pub active: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            active: true,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.size.x / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Integrate velocity over one step
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub body: Body,
    pub radius: f32,
    /// Scalar speed, kept separate from the direction carried by `body.vel`
    pub speed: f32,
    /// Speed with no timed effect applied. Paddle boosts advance it in
    /// step with `speed`; speed effects scale from it and restore it on
    /// revert.
    pub base_speed: f32,
    /// Attached balls ride the paddle with zero velocity
    pub attached: bool,
    /// Remaining brick hits this ball passes through without deflecting
    pub pierce: u32,
}

impl Ball {
    pub fn new(id: u32, speed: f32) -> Self {
        Self {
            id,
            body: Body::new(Vec2::ZERO, Vec2::splat(BALL_RADIUS * 2.0)),
            radius: BALL_RADIUS,
            speed,
            base_speed: speed,
            attached: true,
            pierce: 0,
        }
    }

    /// Clamp scalar speed to the legal range and rescale velocity to match
    pub fn clamp_speed(&mut self) {
        self.speed = self.speed.clamp(BALL_MIN_SPEED, BALL_MAX_SPEED);
        if !self.attached {
            self.body.vel = self.body.vel.normalize_or_zero() * self.speed;
        }
    }

    /// Set scalar speed (clamped), preserving direction
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        self.clamp_speed();
    }

    pub fn reverse_dir_x(&mut self) {
        self.body.vel.x = -self.body.vel.x;
    }

    pub fn reverse_dir_y(&mut self) {
        self.body.vel.y = -self.body.vel.y;
    }

    /// Keep an attached ball riding on top of the paddle
    pub fn update_attached(&mut self, paddle: &Paddle) {
        if self.attached {
            self.body.vel = Vec2::ZERO;
            self.body.pos = Vec2::new(
                paddle.body.pos.x,
                paddle.body.top() - self.radius - 1.0,
            );
        }
    }

    /// Launch an attached ball upward
    pub fn launch(&mut self) {
        if self.attached {
            self.attached = false;
            self.body.vel = Vec2::new(0.0, -1.0) * self.speed;
            self.clamp_speed();
        }
    }

    /// Rebound off the paddle: re-angle by the normalized hit position and
    /// re-apply the paddle speed-up.
    ///
    /// `hit_ratio` is already clamped to [-1, 1] by the collision sweep;
    /// 0 rebounds straight up, ±1 at the steepest allowed angle.
    pub fn bounce_off_paddle(&mut self, hit_ratio: f32) {
        let angle = hit_ratio * MAX_BOUNCE_ANGLE;
        let dir = Vec2::new(angle.sin(), -angle.cos());
        self.speed = (self.speed * PADDLE_BOOST).clamp(BALL_MIN_SPEED, BALL_MAX_SPEED);
        // Base speed advances with the boost so a speed effect's revert
        // lands on the boosted value, not the pre-boost one
        self.base_speed = (self.base_speed * PADDLE_BOOST).clamp(BALL_MIN_SPEED, BALL_MAX_SPEED);
        self.body.vel = dir * self.speed;
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub body: Body,
    /// Horizontal speed used by the input adapter
    pub speed: f32,
    /// Movement bounds for the paddle center
    pub min_x: f32,
    pub max_x: f32,
    /// Width before any expand effect, so removal can round-trip
    pub base_width: f32,
}

impl Paddle {
    pub fn new(speed: f32) -> Self {
        let size = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
        Self {
            body: Body::new(Vec2::new(SCREEN_WIDTH / 2.0, PADDLE_Y), size),
            speed,
            min_x: PADDLE_WIDTH / 2.0,
            max_x: SCREEN_WIDTH - PADDLE_WIDTH / 2.0,
            base_width: PADDLE_WIDTH,
        }
    }

    /// Recompute movement bounds from the current width
    pub fn refresh_bounds(&mut self) {
        self.min_x = self.body.size.x / 2.0;
        self.max_x = SCREEN_WIDTH - self.body.size.x / 2.0;
    }

    /// Apply horizontal intent for one step, clamped to the bounds
    pub fn advance(&mut self, dt: f32) {
        self.body.pos.x =
            (self.body.pos.x + self.body.vel.x * dt).clamp(self.min_x, self.max_x);
    }

    /// Reset position and width between levels
    pub fn reset(&mut self) {
        self.body.size.x = self.base_width;
        self.refresh_bounds();
        self.body.pos = Vec2::new(SCREEN_WIDTH / 2.0, PADDLE_Y);
        self.body.vel = Vec2::ZERO;
    }
}

/// Brick variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickKind {
    #[default]
    Normal,
    Hard,
    Explosive,
    Healing,
    /// Cannot be destroyed, doesn't count for level clear
    Unbreakable,
}

/// Healing-brick cycle: damaged bricks regenerate after a delay
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum HealState {
    #[default]
    Visible,
    Damaged {
        timer: f32,
    },
}

/// Outcome of applying one hit to a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Unbreakable, or already destroyed (idempotent no-op)
    Ignored,
    /// Took the hit, still standing
    Damaged,
    /// This hit destroyed the brick
    Destroyed,
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub body: Body,
    pub kind: BrickKind,
    pub hp: i32,
    pub destroyed: bool,
    #[serde(default)]
    pub heal: HealState,
}

impl Brick {
    /// Apply one hit. Already-destroyed bricks and Unbreakable bricks
    /// ignore it; durability never goes negative.
    pub fn take_damage(&mut self) -> DamageOutcome {
        if self.destroyed || self.kind == BrickKind::Unbreakable {
            return DamageOutcome::Ignored;
        }
        match self.kind {
            BrickKind::Explosive => {
                self.destroy();
                DamageOutcome::Destroyed
            }
            BrickKind::Healing => match self.heal {
                HealState::Visible => {
                    self.heal = HealState::Damaged { timer: 0.0 };
                    DamageOutcome::Damaged
                }
                HealState::Damaged { .. } => {
                    self.destroy();
                    DamageOutcome::Destroyed
                }
            },
            _ => {
                self.hp -= 1;
                if self.hp <= 0 {
                    self.destroy();
                    DamageOutcome::Destroyed
                } else {
                    DamageOutcome::Damaged
                }
            }
        }
    }

    /// Advance the healing timer; damaged healing bricks regenerate
    /// once `heal_delay` elapses.
    pub fn heal_tick(&mut self, dt: f32, heal_delay: f32) {
        if self.destroyed || self.kind != BrickKind::Healing {
            return;
        }
        if let HealState::Damaged { ref mut timer } = self.heal {
            *timer += dt;
            if *timer >= heal_delay {
                self.heal = HealState::Visible;
            }
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.body.active = false;
    }

    /// Assign the entity ID (factories build bricks before an ID exists)
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Returns true if this brick must be destroyed to clear the level
    pub fn counts_for_clear(&self) -> bool {
        self.kind != BrickKind::Unbreakable
    }
}

/// Enemy variants (the boss is a distinguished enemy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Drifts straight down
    Drone,
    /// Bounded left-right patrol
    Patroller,
    /// Holds position
    Sentry,
    /// Wait-then-dash bursts
    Dasher,
    /// Spawned by the boss in phase 2
    Minion,
    Boss,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub kind: EnemyKind,
    pub hp: i32,
    pub max_hp: i32,
    /// Set once the enemy has fully entered the play area from above
    pub entered_screen: bool,
    pub movement: MovementKind,
    pub score_value: u64,
    /// Phase machine, present only on the boss
    #[serde(default)]
    pub phase: Option<BossPhase>,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    /// Apply damage; returns true if this kills the enemy. Dying bosses
    /// are immune (the death animation owns their remaining lifetime).
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.body.active || matches!(self.phase, Some(BossPhase::Dying { .. })) {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0 && !self.is_boss() {
            self.body.active = false;
            return true;
        }
        self.hp <= 0
    }
}

/// An enemy projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub body: Body,
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub body: Body,
    pub kind: super::powerup::PowerUpKind,
    /// Caught by the paddle; effect applied, awaiting cull
    pub taken: bool,
}

/// A decorative particle (never gameplay-affecting)
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Kind tag for color lookup by the renderer
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// RNG state wrapper: serialized as a seed, reconstructed on restore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete simulation context. Owns every live collection; the collision
/// sweep only borrows them for the duration of one pass.
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Current level index (0-based)
    pub level_index: u32,
    pub score: u64,
    pub lives: u8,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    /// Timed power-up effects currently active
    pub effects: Vec<ActiveEffect>,
    /// Frame event queue, drained once per tick
    pub events: EventQueue,
    /// Latched when the level-cleared event has fired for this level
    pub level_cleared: bool,
    next_id: u32,
}

impl World {
    /// Create a new world with the given seed and tuning
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let paddle = Paddle::new(tuning.paddle_speed);
        let mut world = Self {
            seed,
            rng: RngState::new(seed).to_rng(),
            phase: GamePhase::Serve,
            level_index: 0,
            score: 0,
            lives: START_LIVES,
            time_ticks: 0,
            paddle,
            balls: Vec::new(),
            bricks: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            effects: Vec::new(),
            events: EventQueue::new(),
            level_cleared: false,
            tuning,
            next_id: 1,
        };
        world.spawn_ball_attached();
        world
    }

    /// Reset the ID allocator; used when rebuilding a world from a snapshot
    pub(crate) fn reset_id_allocator(&mut self, next: u32) {
        self.next_id = next;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a ball attached to the paddle
    pub fn spawn_ball_attached(&mut self) {
        let id = self.next_entity_id();
        let mut ball = Ball::new(id, self.tuning.ball_start_speed);
        ball.update_attached(&self.paddle);
        self.balls.push(ball);
    }

    /// Load a level layout: clears live entities, resets the paddle, builds
    /// bricks through the factory, and serves a fresh ball. Lives, score,
    /// and level index persist across loads.
    pub fn load_level(&mut self, layout: &str) -> Result<(), super::factory::SpawnError> {
        let bricks = super::level::parse_layout(layout)?;
        self.balls.clear();
        self.bricks.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.effects.clear();
        self.paddle.reset();
        self.level_cleared = false;
        for brick in bricks {
            let id = self.next_entity_id();
            self.bricks.push(brick.with_id(id));
        }
        self.spawn_ball_attached();
        self.phase = GamePhase::Serve;
        log::info!(
            "level {} loaded: {} bricks",
            self.level_index,
            self.bricks.len()
        );
        Ok(())
    }

    /// The boss enemy, if one is alive
    pub fn boss_mut(&mut self) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.is_boss() && e.body.active)
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss() && e.body.active)
    }

    /// Level is complete when no breakable brick stands and no enemy
    /// (boss included) is alive. Unbreakable bricks don't count.
    pub fn is_level_complete(&self) -> bool {
        let bricks_left = self
            .bricks
            .iter()
            .any(|b| !b.destroyed && b.counts_for_clear());
        let enemies_left = self.enemies.iter().any(|e| e.body.active);
        !bricks_left && !enemies_left
    }

    /// Push a particle, evicting the oldest when at the cap
    pub fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// End-of-frame cull: drop every entity flagged inactive. Entities are
    /// never removed mid-iteration; deactivation marks them and this pass
    /// physically removes them.
    pub fn cull(&mut self) {
        self.balls.retain(|b| b.body.active);
        self.bricks.retain(|b| b.body.active && !b.destroyed);
        self.enemies.retain(|e| e.body.active);
        self.projectiles.retain(|p| p.body.active);
        self.power_ups.retain(|p| p.body.active && !p.taken);
        self.particles.retain(|p| p.life > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_edges() {
        let b = Body::new(Vec2::new(100.0, 50.0), Vec2::new(40.0, 20.0));
        assert_eq!(b.left(), 80.0);
        assert_eq!(b.right(), 120.0);
        assert_eq!(b.top(), 40.0);
        assert_eq!(b.bottom(), 60.0);
    }

    #[test]
    fn test_reverse_dir_twice_restores_sign() {
        let mut ball = Ball::new(1, 300.0);
        ball.attached = false;
        ball.body.vel = Vec2::new(120.0, -260.0);
        let original = ball.body.vel;
        ball.reverse_dir_x();
        ball.reverse_dir_x();
        assert_eq!(ball.body.vel, original);
        ball.reverse_dir_y();
        ball.reverse_dir_y();
        assert_eq!(ball.body.vel, original);
    }

    #[test]
    fn test_ball_speed_clamped() {
        let mut ball = Ball::new(1, 300.0);
        ball.attached = false;
        ball.body.vel = Vec2::new(0.0, -1.0) * 300.0;
        ball.set_speed(10_000.0);
        assert_eq!(ball.speed, BALL_MAX_SPEED);
        assert!((ball.body.vel.length() - BALL_MAX_SPEED).abs() < 0.01);
        ball.set_speed(1.0);
        assert_eq!(ball.speed, BALL_MIN_SPEED);
    }

    #[test]
    fn test_brick_damage_idempotent() {
        let mut brick = Brick {
            id: 1,
            body: Body::new(Vec2::ZERO, Vec2::new(BRICK_WIDTH, BRICK_HEIGHT)),
            kind: BrickKind::Normal,
            hp: 1,
            destroyed: false,
            heal: HealState::Visible,
        };
        assert_eq!(brick.take_damage(), DamageOutcome::Destroyed);
        assert!(brick.destroyed);
        // Second hit is a no-op and durability stays at zero
        assert_eq!(brick.take_damage(), DamageOutcome::Ignored);
        assert_eq!(brick.hp, 0);
    }

    #[test]
    fn test_unbreakable_never_destroyed() {
        let mut brick = Brick {
            id: 1,
            body: Body::new(Vec2::ZERO, Vec2::new(BRICK_WIDTH, BRICK_HEIGHT)),
            kind: BrickKind::Unbreakable,
            hp: 1,
            destroyed: false,
            heal: HealState::Visible,
        };
        for _ in 0..10 {
            assert_eq!(brick.take_damage(), DamageOutcome::Ignored);
        }
        assert!(!brick.destroyed);
        assert!(!brick.counts_for_clear());
    }

    #[test]
    fn test_healing_brick_cycle() {
        let mut brick = Brick {
            id: 1,
            body: Body::new(Vec2::ZERO, Vec2::new(BRICK_WIDTH, BRICK_HEIGHT)),
            kind: BrickKind::Healing,
            hp: 1,
            destroyed: false,
            heal: HealState::Visible,
        };
        assert_eq!(brick.take_damage(), DamageOutcome::Damaged);
        assert!(matches!(brick.heal, HealState::Damaged { .. }));

        // Heals back after the delay
        brick.heal_tick(3.5, 3.0);
        assert_eq!(brick.heal, HealState::Visible);

        // Second hit while damaged destroys it
        assert_eq!(brick.take_damage(), DamageOutcome::Damaged);
        assert_eq!(brick.take_damage(), DamageOutcome::Destroyed);
    }

    #[test]
    fn test_attached_ball_tracks_paddle() {
        let mut world = World::new(7, Tuning::default());
        world.paddle.body.pos.x = 200.0;
        let paddle = world.paddle.clone();
        for ball in &mut world.balls {
            ball.update_attached(&paddle);
            assert_eq!(ball.body.vel, Vec2::ZERO);
            assert_eq!(ball.body.pos.x, 200.0);
        }
    }

    #[test]
    fn test_cull_removes_inactive() {
        let mut world = World::new(7, Tuning::default());
        world.balls[0].body.active = false;
        let id = world.next_entity_id();
        world.projectiles.push(Projectile {
            id,
            body: Body::new(Vec2::ZERO, Vec2::new(6.0, 14.0)),
        });
        world.projectiles[0].body.active = false;
        world.cull();
        assert!(world.balls.is_empty());
        assert!(world.projectiles.is_empty());
    }
}
