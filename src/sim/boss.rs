//! Boss phase state machine
//!
//! Phases are data (tag + per-phase timers) advanced by one transition
//! function, not strategy objects swapping themselves. Progression:
//! Entry -> Phase1 -> Enrage -> Phase2, with Dying as a terminal phase
//! entered only from the external health check in the tick driver
//! ([`check_death`]), never from inside the machine.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::factory;
use super::movement::MovementKind;
use super::state::{EnemyKind, Particle, World};
use crate::consts::*;

/// Shake oscillation rate during enrage (radians/sec)
const SHAKE_FREQUENCY: f32 = 28.0;
/// Destruction particles per tick while dying
const DEATH_PARTICLES_PER_TICK: usize = 3;

/// An in-flight homing burst: shots fired one at a time, each aimed at
/// the paddle's position at its moment of release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volley {
    pub remaining: u32,
    pub delay_timer: f32,
}

/// The boss's current phase plus its timers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Descending into the play area; ends at the target height
    Entry,
    /// Periodic single aimed shots
    Phase1 { shot_timer: f32 },
    /// Frozen in place, shaking; hands off to Phase2 when the timer runs out
    Enrage { timer: f32, anchor_x: f32 },
    /// Shots + minion spawns + homing volleys
    Phase2 {
        shot_timer: f32,
        minion_timer: f32,
        volley_timer: f32,
        volley: Option<Volley>,
    },
    /// Terminal: ignores health, plays out destruction, then deactivates
    Dying { timer: f32 },
}

impl BossPhase {
    pub fn name(&self) -> &'static str {
        match self {
            BossPhase::Entry => "entry",
            BossPhase::Phase1 { .. } => "phase1",
            BossPhase::Enrage { .. } => "enrage",
            BossPhase::Phase2 { .. } => "phase2",
            BossPhase::Dying { .. } => "dying",
        }
    }
}

/// External death trigger: the tick driver calls this after damage has been
/// applied. Entering Dying from here (rather than inside the machine) keeps
/// the terminal transition at a single, visible call site.
pub fn check_death(world: &mut World) {
    let Some(boss) = world.boss_mut() else { return };
    if boss.hp > 0 || matches!(boss.phase, Some(BossPhase::Dying { .. })) {
        return;
    }
    boss.movement = MovementKind::Static;
    boss.phase = Some(BossPhase::Dying { timer: 0.0 });
    world.events.push(GameEvent::BossPhaseChanged { name: "dying" });
}

/// Advance the boss phase machine by one step. Movement itself is stepped
/// with the other enemies; this drives transitions, timers, and attacks.
pub fn update(world: &mut World, dt: f32) {
    let Some(idx) = world
        .enemies
        .iter()
        .position(|e| e.is_boss() && e.body.active)
    else {
        return;
    };
    let Some(mut phase) = world.enemies[idx].phase.take() else {
        return;
    };

    match &mut phase {
        BossPhase::Entry => {
            if world.enemies[idx].body.pos.y >= BOSS_TARGET_Y {
                let boss = &mut world.enemies[idx];
                boss.body.pos.y = BOSS_TARGET_Y;
                boss.entered_screen = true;
                boss.movement = MovementKind::Static;
                phase = BossPhase::Phase1 { shot_timer: 0.0 };
                world.events.push(GameEvent::BossPhaseChanged { name: "phase1" });
            }
        }

        BossPhase::Phase1 { shot_timer } => {
            *shot_timer += dt;
            if *shot_timer >= world.tuning.boss_phase1_shot_interval {
                *shot_timer = 0.0;
                fire_at_paddle(world, idx);
            }
            // Health threshold: enrage exactly once at half health. Once
            // the phase leaves Phase1 this check is unreachable, so
            // repeated damage past the threshold can't re-trigger it.
            let boss = &world.enemies[idx];
            if boss.hp <= boss.max_hp / 2 {
                let anchor_x = boss.body.pos.x;
                world.enemies[idx].movement = MovementKind::Static;
                phase = BossPhase::Enrage {
                    timer: 0.0,
                    anchor_x,
                };
                world.events.push(GameEvent::BossPhaseChanged { name: "enrage" });
            }
        }

        BossPhase::Enrage { timer, anchor_x } => {
            *timer += dt;
            // Horizontal position stays frozen at the anchor; the shake is
            // a pure sinusoidal offset on top of it.
            world.enemies[idx].body.pos.x =
                *anchor_x + world.tuning.boss_shake_amplitude * (SHAKE_FREQUENCY * *timer).sin();
            if *timer >= world.tuning.boss_enrage_duration {
                let anchor = *anchor_x;
                let boss = &mut world.enemies[idx];
                boss.body.pos.x = anchor;
                boss.movement = MovementKind::Patrol {
                    min_x: BOSS_WIDTH / 2.0,
                    max_x: SCREEN_WIDTH - BOSS_WIDTH / 2.0,
                    speed: world.tuning.enemy_patrol_speed,
                    dir: 1.0,
                };
                phase = BossPhase::Phase2 {
                    shot_timer: 0.0,
                    minion_timer: 0.0,
                    volley_timer: 0.0,
                    volley: None,
                };
                world.events.push(GameEvent::BossPhaseChanged { name: "phase2" });
            }
        }

        BossPhase::Phase2 {
            shot_timer,
            minion_timer,
            volley_timer,
            volley,
        } => {
            *shot_timer += dt;
            if *shot_timer >= world.tuning.boss_phase2_shot_interval {
                *shot_timer = 0.0;
                fire_at_paddle(world, idx);
            }

            *minion_timer += dt;
            if *minion_timer >= world.tuning.boss_minion_interval {
                *minion_timer = 0.0;
                spawn_minion(world, idx);
            }

            match volley {
                None => {
                    *volley_timer += dt;
                    if *volley_timer >= world.tuning.boss_volley_interval {
                        *volley_timer = 0.0;
                        *volley = Some(Volley {
                            remaining: world.tuning.boss_volley_size,
                            delay_timer: world.tuning.boss_volley_shot_delay,
                        });
                    }
                }
                Some(v) => {
                    v.delay_timer += dt;
                    while v.remaining > 0 && v.delay_timer >= world.tuning.boss_volley_shot_delay
                    {
                        v.delay_timer -= world.tuning.boss_volley_shot_delay;
                        v.remaining -= 1;
                        fire_at_paddle(world, idx);
                    }
                    if v.remaining == 0 {
                        *volley = None;
                    }
                }
            }
        }

        BossPhase::Dying { timer } => {
            *timer += dt;
            // Decorative destruction at random points inside the boss bounds
            let body = world.enemies[idx].body;
            for _ in 0..DEATH_PARTICLES_PER_TICK {
                let pos = Vec2::new(
                    world.rng.random_range(body.left()..body.right()),
                    world.rng.random_range(body.top()..body.bottom()),
                );
                let vel = Vec2::new(
                    world.rng.random_range(-80.0..80.0),
                    world.rng.random_range(-120.0..20.0),
                );
                let size = world.rng.random_range(3.0..8.0);
                world.push_particle(Particle {
                    pos,
                    vel,
                    color: 6,
                    life: 1.0,
                    size,
                });
            }
            if *timer >= world.tuning.boss_death_duration {
                let boss = &mut world.enemies[idx];
                boss.body.active = false;
                let (id, kind, score, pos) =
                    (boss.id, boss.kind, boss.score_value, boss.body.pos);
                world.events.push(GameEvent::EnemyDestroyed {
                    enemy: id,
                    kind,
                    score,
                    pos,
                });
            }
        }
    }

    if let Some(boss) = world.enemies.get_mut(idx) {
        boss.phase = Some(phase);
    }
}

/// Fire one projectile from the boss's underside, aimed at the paddle's
/// current position.
fn fire_at_paddle(world: &mut World, boss_idx: usize) {
    let origin = Vec2::new(
        world.enemies[boss_idx].body.pos.x,
        world.enemies[boss_idx].body.bottom(),
    );
    let dir = (world.paddle.body.pos - origin).normalize_or_zero();
    let dir = if dir == Vec2::ZERO { Vec2::new(0.0, 1.0) } else { dir };
    let id = world.next_entity_id();
    let projectile = factory::spawn_projectile(id, origin, dir * world.tuning.projectile_speed);
    world.projectiles.push(projectile);
}

/// Summon a minion just below the boss
fn spawn_minion(world: &mut World, boss_idx: usize) {
    let pos = Vec2::new(
        world.enemies[boss_idx].body.pos.x,
        world.enemies[boss_idx].body.bottom() + ENEMY_SIZE / 2.0,
    );
    let id = world.next_entity_id();
    let minion = factory::spawn_enemy(id, EnemyKind::Minion, pos, &world.tuning);
    world.enemies.push(minion);
    log::debug!("boss spawned minion {id}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::movement;

    fn world_with_boss() -> World {
        let mut world = crate::sim::state::World::new(21, Tuning::default());
        let id = world.next_entity_id();
        let boss = factory::spawn_boss(id, &world.tuning);
        world.enemies.push(boss);
        world
    }

    /// Step movement + phase machine like the tick driver does
    fn step_boss(world: &mut World, dt: f32) {
        let mut rng = world.rng.clone();
        for enemy in world.enemies.iter_mut() {
            movement::step(&mut enemy.body, &mut enemy.movement, dt, &mut rng);
        }
        world.rng = rng;
        update(world, dt);
    }

    #[test]
    fn test_entry_ends_at_target_height() {
        let mut world = world_with_boss();
        for _ in 0..2000 {
            step_boss(&mut world, 1.0 / 120.0);
            if matches!(world.boss().unwrap().phase, Some(BossPhase::Phase1 { .. })) {
                break;
            }
        }
        let boss = world.boss().unwrap();
        assert!(matches!(boss.phase, Some(BossPhase::Phase1 { .. })));
        assert!((boss.body.pos.y - BOSS_TARGET_Y).abs() < 0.01);
        assert_eq!(boss.movement, MovementKind::Static);
    }

    #[test]
    fn test_phase1_fires_periodically() {
        let mut world = world_with_boss();
        world.boss_mut().unwrap().phase = Some(BossPhase::Phase1 { shot_timer: 0.0 });
        world.boss_mut().unwrap().body.pos.y = BOSS_TARGET_Y;
        world.boss_mut().unwrap().movement = MovementKind::Static;

        let interval = world.tuning.boss_phase1_shot_interval;
        let steps = (interval * 3.5 / (1.0 / 120.0)) as usize;
        for _ in 0..steps {
            step_boss(&mut world, 1.0 / 120.0);
        }
        assert_eq!(world.projectiles.len(), 3);
        // Shots head toward the paddle (downward)
        assert!(world.projectiles.iter().all(|p| p.body.vel.y > 0.0));
    }

    #[test]
    fn test_enrage_triggers_exactly_once_at_half_health() {
        let mut world = world_with_boss();
        world.boss_mut().unwrap().phase = Some(BossPhase::Phase1 { shot_timer: 0.0 });
        world.boss_mut().unwrap().body.pos.y = BOSS_TARGET_Y;
        let max_hp = world.boss().unwrap().max_hp;

        // Damage to just above the threshold: still phase 1
        world.boss_mut().unwrap().hp = max_hp / 2 + 1;
        step_boss(&mut world, 1.0 / 120.0);
        assert!(matches!(
            world.boss().unwrap().phase,
            Some(BossPhase::Phase1 { .. })
        ));

        // Crossing the threshold enrages
        world.boss_mut().unwrap().hp = max_hp / 2;
        step_boss(&mut world, 1.0 / 120.0);
        assert!(matches!(
            world.boss().unwrap().phase,
            Some(BossPhase::Enrage { .. })
        ));

        // Further damage can't re-trigger the transition: the machine
        // rides enrage to completion, then lands in phase 2
        world.boss_mut().unwrap().hp = 1;
        let duration = world.tuning.boss_enrage_duration;
        let steps = (duration * 1.5 / (1.0 / 120.0)) as usize;
        let mut enrage_entries = 0;
        for _ in 0..steps {
            let was_enrage = matches!(
                world.boss().unwrap().phase,
                Some(BossPhase::Enrage { .. })
            );
            step_boss(&mut world, 1.0 / 120.0);
            let is_enrage = matches!(
                world.boss().unwrap().phase,
                Some(BossPhase::Enrage { .. })
            );
            if is_enrage && !was_enrage {
                enrage_entries += 1;
            }
        }
        assert_eq!(enrage_entries, 0);
        assert!(matches!(
            world.boss().unwrap().phase,
            Some(BossPhase::Phase2 { .. })
        ));
    }

    #[test]
    fn test_enrage_freezes_anchor_and_hands_off_to_patrol() {
        let mut world = world_with_boss();
        let anchor = 300.0;
        {
            let boss = world.boss_mut().unwrap();
            boss.body.pos = Vec2::new(anchor, BOSS_TARGET_Y);
            boss.phase = Some(BossPhase::Enrage {
                timer: 0.0,
                anchor_x: anchor,
            });
            boss.movement = MovementKind::Static;
        }
        let amplitude = world.tuning.boss_shake_amplitude;

        // While enraged the boss never leaves the shake envelope
        let steps = (world.tuning.boss_enrage_duration / (1.0 / 120.0)) as usize - 2;
        for _ in 0..steps {
            step_boss(&mut world, 1.0 / 120.0);
            let x = world.boss().unwrap().body.pos.x;
            assert!((x - anchor).abs() <= amplitude + 0.01);
        }

        // Run out the clock: phase 2 with patrol movement
        for _ in 0..10 {
            step_boss(&mut world, 1.0 / 120.0);
        }
        let boss = world.boss().unwrap();
        assert!(matches!(boss.phase, Some(BossPhase::Phase2 { .. })));
        assert!(matches!(boss.movement, MovementKind::Patrol { .. }));
    }

    #[test]
    fn test_phase2_spawns_minions_and_volleys() {
        let mut world = world_with_boss();
        {
            let boss = world.boss_mut().unwrap();
            boss.body.pos = Vec2::new(400.0, BOSS_TARGET_Y);
            boss.phase = Some(BossPhase::Phase2 {
                shot_timer: 0.0,
                minion_timer: 0.0,
                volley_timer: 0.0,
                volley: None,
            });
            boss.movement = MovementKind::Static;
        }

        let horizon = world.tuning.boss_minion_interval.max(
            world.tuning.boss_volley_interval
                + world.tuning.boss_volley_size as f32 * world.tuning.boss_volley_shot_delay,
        ) + 0.5;
        let steps = (horizon / (1.0 / 120.0)) as usize;
        for _ in 0..steps {
            step_boss(&mut world, 1.0 / 120.0);
        }

        let minions = world
            .enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Minion)
            .count();
        assert!(minions >= 1);

        // At least one full volley on top of the periodic shots
        let expected_periodic = (horizon / world.tuning.boss_phase2_shot_interval) as usize;
        assert!(world.projectiles.len() >= expected_periodic + world.tuning.boss_volley_size as usize);
    }

    #[test]
    fn test_dying_only_via_external_check() {
        let mut world = world_with_boss();
        {
            let boss = world.boss_mut().unwrap();
            boss.body.pos = Vec2::new(400.0, BOSS_TARGET_Y);
            boss.phase = Some(BossPhase::Phase2 {
                shot_timer: 0.0,
                minion_timer: 0.0,
                volley_timer: 0.0,
                volley: None,
            });
            boss.hp = 0;
        }

        // The machine itself never enters Dying
        update(&mut world, 1.0 / 120.0);
        assert!(!matches!(
            world.boss().unwrap().phase,
            Some(BossPhase::Dying { .. })
        ));

        // The external health check does
        check_death(&mut world);
        assert!(matches!(
            world.boss().unwrap().phase,
            Some(BossPhase::Dying { .. })
        ));

        // Dying ignores health and deactivates after the duration
        world.boss_mut().unwrap().hp = -100;
        let steps = (world.tuning.boss_death_duration / (1.0 / 120.0)) as usize + 2;
        for _ in 0..steps {
            update(&mut world, 1.0 / 120.0);
        }
        assert!(world.boss().is_none());
        assert!(!world.particles.is_empty());
    }

    #[test]
    fn test_check_death_is_idempotent() {
        let mut world = world_with_boss();
        world.boss_mut().unwrap().hp = 0;
        check_death(&mut world);
        let phase_after_first = world.boss().unwrap().phase;
        check_death(&mut world);
        assert_eq!(world.boss().unwrap().phase, phase_after_first);
    }
}
