//! Entity factories
//!
//! Small construction functions keyed by type codes and kind enums. Level
//! layouts and snapshot restore both go through these, so a brick spawned
//! from a save behaves exactly like one spawned fresh. An unregistered
//! code is a fatal construction error surfaced to the caller; a spawn
//! never silently yields a null entity.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::boss::BossPhase;
use super::movement::MovementKind;
use super::state::{Body, Brick, BrickKind, Enemy, EnemyKind, HealState, PowerUp, Projectile};
use crate::consts::*;
use crate::settings::Tuning;

/// Fatal construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// Level layout referenced a brick code nobody registered
    UnknownBrickCode { code: char },
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnError::UnknownBrickCode { code } => {
                write!(f, "unknown brick type code {code:?}")
            }
        }
    }
}

impl std::error::Error for SpawnError {}

/// Map a level-layout code to a brick kind.
/// `_` (empty cell) is the layout parser's concern, not a brick code.
pub fn brick_kind_from_code(code: char) -> Result<BrickKind, SpawnError> {
    match code {
        'N' => Ok(BrickKind::Normal),
        'H' => Ok(BrickKind::Hard),
        'E' => Ok(BrickKind::Explosive),
        'G' => Ok(BrickKind::Healing),
        'U' => Ok(BrickKind::Unbreakable),
        _ => Err(SpawnError::UnknownBrickCode { code }),
    }
}

/// Starting durability per brick kind
pub fn brick_hp(kind: BrickKind) -> i32 {
    match kind {
        BrickKind::Hard => 2,
        // Unbreakable hp is never consulted; damage ignores it
        BrickKind::Unbreakable => i32::MAX,
        _ => 1,
    }
}

/// Build a brick of the given kind at the given center position.
/// The caller assigns the entity ID.
pub fn spawn_brick(kind: BrickKind, pos: Vec2) -> Brick {
    Brick {
        id: 0,
        body: Body::new(pos, Vec2::new(BRICK_WIDTH, BRICK_HEIGHT)),
        kind,
        hp: brick_hp(kind),
        destroyed: false,
        heal: HealState::Visible,
    }
}

/// Build a brick from a layout code
pub fn brick_from_code(code: char, pos: Vec2) -> Result<Brick, SpawnError> {
    Ok(spawn_brick(brick_kind_from_code(code)?, pos))
}

/// Build an enemy of the given kind with its default movement strategy
pub fn spawn_enemy(id: u32, kind: EnemyKind, pos: Vec2, tuning: &Tuning) -> Enemy {
    debug_assert!(kind != EnemyKind::Boss, "use spawn_boss");
    let movement = match kind {
        EnemyKind::Drone | EnemyKind::Minion => MovementKind::Descend {
            speed: tuning.enemy_descend_speed,
        },
        EnemyKind::Patroller => MovementKind::Patrol {
            min_x: ENEMY_SIZE / 2.0,
            max_x: SCREEN_WIDTH - ENEMY_SIZE / 2.0,
            speed: tuning.enemy_patrol_speed,
            dir: 1.0,
        },
        EnemyKind::Sentry => MovementKind::Static,
        EnemyKind::Dasher => MovementKind::DashWait {
            wait: tuning.enemy_dash_wait,
            dash_duration: tuning.enemy_dash_duration,
            speed: tuning.enemy_dash_speed,
            timer: 0.0,
            dashing: false,
            dir: Vec2::ZERO,
        },
        EnemyKind::Boss => MovementKind::Static,
    };
    let (hp, score_value) = match kind {
        EnemyKind::Drone => (1, 50),
        EnemyKind::Patroller => (2, 75),
        EnemyKind::Sentry => (3, 100),
        EnemyKind::Dasher => (2, 120),
        EnemyKind::Minion => (1, 30),
        EnemyKind::Boss => (1, 0),
    };
    Enemy {
        id,
        body: Body::new(pos, Vec2::splat(ENEMY_SIZE)),
        kind,
        hp,
        max_hp: hp,
        entered_screen: pos.y > ENEMY_SIZE / 2.0,
        movement,
        score_value,
        phase: None,
    }
}

/// Build the boss above the top edge, entering the play area
pub fn spawn_boss(id: u32, tuning: &Tuning) -> Enemy {
    Enemy {
        id,
        body: Body::new(
            Vec2::new(SCREEN_WIDTH / 2.0, -BOSS_HEIGHT / 2.0),
            Vec2::new(BOSS_WIDTH, BOSS_HEIGHT),
        ),
        kind: EnemyKind::Boss,
        hp: tuning.boss_max_hp,
        max_hp: tuning.boss_max_hp,
        entered_screen: false,
        movement: MovementKind::Descend {
            speed: tuning.boss_entry_speed,
        },
        score_value: tuning.boss_score,
        phase: Some(BossPhase::Entry),
    }
}

/// Build a falling power-up capsule
pub fn spawn_power_up(
    id: u32,
    kind: super::powerup::PowerUpKind,
    pos: Vec2,
    fall_speed: f32,
) -> PowerUp {
    let mut body = Body::new(pos, Vec2::splat(POWER_UP_SIZE));
    body.vel = Vec2::new(0.0, fall_speed);
    PowerUp {
        id,
        body,
        kind,
        taken: false,
    }
}

/// Build an enemy projectile with the given velocity
pub fn spawn_projectile(id: u32, pos: Vec2, vel: Vec2) -> Projectile {
    let mut body = Body::new(pos, Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT));
    body.vel = vel;
    Projectile { id, body }
}

/// Drop table: roll which power-up a destroyed brick yields
pub fn roll_power_up(rng: &mut Pcg32) -> super::powerup::PowerUpKind {
    use super::powerup::PowerUpKind::*;
    match rng.random_range(0..100u32) {
        0..25 => ExpandPaddle,
        25..45 => SlowBall,
        45..60 => FastBall,
        60..75 => MultiBall,
        75..90 => Pierce,
        _ => ExtraLife,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_known_codes_build_bricks() {
        for (code, kind) in [
            ('N', BrickKind::Normal),
            ('H', BrickKind::Hard),
            ('E', BrickKind::Explosive),
            ('G', BrickKind::Healing),
            ('U', BrickKind::Unbreakable),
        ] {
            let brick = brick_from_code(code, Vec2::new(100.0, 50.0)).unwrap();
            assert_eq!(brick.kind, kind);
            assert!(!brick.destroyed);
        }
    }

    #[test]
    fn test_unknown_code_is_fatal() {
        let err = brick_from_code('Z', Vec2::ZERO).unwrap_err();
        assert_eq!(err, SpawnError::UnknownBrickCode { code: 'Z' });
        // Empty-cell marker is not a brick code either
        assert!(brick_from_code('_', Vec2::ZERO).is_err());
    }

    #[test]
    fn test_enemy_movement_matches_kind() {
        let tuning = Tuning::default();
        let drone = spawn_enemy(1, EnemyKind::Drone, Vec2::new(100.0, 50.0), &tuning);
        assert!(matches!(drone.movement, MovementKind::Descend { .. }));
        let sentry = spawn_enemy(2, EnemyKind::Sentry, Vec2::new(100.0, 50.0), &tuning);
        assert_eq!(sentry.movement, MovementKind::Static);
        let dasher = spawn_enemy(3, EnemyKind::Dasher, Vec2::new(100.0, 50.0), &tuning);
        assert!(matches!(dasher.movement, MovementKind::DashWait { .. }));
    }

    #[test]
    fn test_boss_spawns_in_entry_phase() {
        let boss = spawn_boss(1, &Tuning::default());
        assert!(boss.is_boss());
        assert_eq!(boss.phase, Some(BossPhase::Entry));
        assert!(boss.body.pos.y < 0.0);
        assert_eq!(boss.hp, boss.max_hp);
    }

    #[test]
    fn test_drop_table_covers_all_kinds() {
        use super::super::powerup::PowerUpKind;
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(roll_power_up(&mut rng));
        }
        for kind in [
            PowerUpKind::ExpandPaddle,
            PowerUpKind::SlowBall,
            PowerUpKind::FastBall,
            PowerUpKind::MultiBall,
            PowerUpKind::Pierce,
            PowerUpKind::ExtraLife,
        ] {
            assert!(seen.contains(&kind), "{kind:?} never rolled");
        }
    }
}
