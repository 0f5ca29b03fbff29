//! Headless demo runner
//!
//! Drives the simulation with a trivial ball-tracking paddle for a fixed
//! number of ticks, then prints a run summary. Useful for smoke-testing
//! tuning changes and for profiling the core without a renderer.
//!
//! Usage: brickstorm [tuning.json]

use anyhow::{Context, Result};

use brickstorm::Tuning;
use brickstorm::consts::{MAX_SUBSTEPS, SIM_DT};
use brickstorm::persistence::Snapshot;
use brickstorm::sim::{GamePhase, TickInput, World, factory, level, tick};

const DEMO_SEED: u64 = 0xB51C_0DE5;
/// Simulated presentation rate; the sim substeps at SIM_DT underneath
const FRAME_DT: f32 = 1.0 / 60.0;
const DEMO_FRAMES: u32 = 60 * 90; // 90 seconds of simulated play

fn main() -> Result<()> {
    env_logger::init();

    let tuning = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading tuning file {path}"))?;
            Tuning::from_json(&json).with_context(|| format!("parsing tuning file {path}"))?
        }
        None => Tuning::default(),
    };

    let mut world = World::new(DEMO_SEED, tuning);
    world.load_level(level::DEMO_LAYOUT)?;

    let mut accumulator = 0.0f32;
    'run: for _ in 0..DEMO_FRAMES {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = demo_input(&world);
            tick(&mut world, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            if world.phase == GamePhase::GameOver {
                log::info!("game over at tick {}", world.time_ticks);
                break 'run;
            }
            if world.level_cleared {
                world.level_index += 1;
                if world.level_index > 1 {
                    break 'run;
                }
                // Second level: empty grid, boss fight
                world.load_level("")?;
                let id = world.next_entity_id();
                let boss = factory::spawn_boss(id, &world.tuning);
                world.enemies.push(boss);
                log::info!("boss level started");
            }
        }
    }

    let snapshot = Snapshot::capture(&world);
    println!(
        "ticks={} level={} score={} lives={} balls={} bricks_left={}",
        world.time_ticks,
        world.level_index,
        world.score,
        world.lives,
        world.balls.len(),
        world.bricks.len()
    );
    log::debug!("final snapshot:\n{}", snapshot.to_json()?);
    Ok(())
}

/// Chase the lowest free ball; launch as soon as a serve is pending
fn demo_input(world: &World) -> TickInput {
    let mut input = TickInput::default();
    if world.phase == GamePhase::Serve {
        input.launch = true;
        return input;
    }
    let target = world
        .balls
        .iter()
        .filter(|b| !b.attached)
        .max_by(|a, b| a.body.pos.y.total_cmp(&b.body.pos.y))
        .map(|b| b.body.pos.x);
    if let Some(x) = target {
        let delta = x - world.paddle.body.pos.x;
        if delta.abs() > 4.0 {
            input.paddle_dir = delta.signum();
        }
    }
    input
}
