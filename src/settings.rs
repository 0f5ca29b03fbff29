//! Data-driven gameplay tuning
//!
//! Balance knobs that external configuration may override. Everything here
//! has a sensible default so a missing or partial config file still yields a
//! playable game. Geometry and hard invariants live in [`crate::consts`].

use serde::{Deserialize, Serialize};

/// Gameplay balance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Paddle ===
    /// Horizontal paddle speed (pixels/sec)
    pub paddle_speed: f32,
    /// Width multiplier while the expand effect is active
    pub expand_factor: f32,

    // === Ball ===
    /// Speed of a freshly served ball (pixels/sec)
    pub ball_start_speed: f32,
    /// Ball speed multiplier for the fast effect
    pub fast_factor: f32,
    /// Ball speed multiplier for the slow effect
    pub slow_factor: f32,

    // === Power-ups ===
    /// Probability a destroyed brick drops a power-up (0.0 - 1.0)
    pub drop_chance: f32,
    /// Falling speed of power-up capsules (pixels/sec)
    pub power_up_fall_speed: f32,
    /// Duration of the expand-paddle effect (seconds)
    pub expand_duration: f32,
    /// Duration of the fast/slow ball effects (seconds)
    pub speed_duration: f32,
    /// Duration of the pierce effect (seconds)
    pub pierce_duration: f32,

    // === Bricks ===
    /// Seconds before a damaged healing brick regenerates
    pub heal_delay: f32,

    // === Enemies ===
    /// Descent speed of basic enemies (pixels/sec)
    pub enemy_descend_speed: f32,
    /// Patrol speed of patrolling enemies (pixels/sec)
    pub enemy_patrol_speed: f32,
    /// Dash burst speed (pixels/sec)
    pub enemy_dash_speed: f32,
    /// Seconds an enemy waits between dashes
    pub enemy_dash_wait: f32,
    /// Seconds a dash burst lasts
    pub enemy_dash_duration: f32,
    /// Projectile speed (pixels/sec)
    pub projectile_speed: f32,

    // === Boss ===
    /// Boss hit points at spawn
    pub boss_max_hp: i32,
    /// Descent speed during the entry phase (pixels/sec)
    pub boss_entry_speed: f32,
    /// Seconds between phase-1 shots
    pub boss_phase1_shot_interval: f32,
    /// Enrage shake duration (seconds)
    pub boss_enrage_duration: f32,
    /// Enrage shake amplitude (pixels)
    pub boss_shake_amplitude: f32,
    /// Seconds between phase-2 shots
    pub boss_phase2_shot_interval: f32,
    /// Seconds between phase-2 minion spawns
    pub boss_minion_interval: f32,
    /// Seconds between phase-2 homing volleys
    pub boss_volley_interval: f32,
    /// Shots per homing volley
    pub boss_volley_size: u32,
    /// Delay between shots within a volley (seconds)
    pub boss_volley_shot_delay: f32,
    /// Seconds the dying phase spends on destruction effects
    pub boss_death_duration: f32,
    /// Score awarded for killing the boss
    pub boss_score: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            paddle_speed: 460.0,
            expand_factor: 1.5,

            ball_start_speed: 300.0,
            fast_factor: 1.4,
            slow_factor: 0.65,

            drop_chance: 0.15,
            power_up_fall_speed: 130.0,
            expand_duration: 9.0,
            speed_duration: 6.0,
            pierce_duration: 6.0,

            heal_delay: 3.0,

            enemy_descend_speed: 70.0,
            enemy_patrol_speed: 110.0,
            enemy_dash_speed: 320.0,
            enemy_dash_wait: 1.4,
            enemy_dash_duration: 0.35,
            projectile_speed: 260.0,

            boss_max_hp: 60,
            boss_entry_speed: 60.0,
            boss_phase1_shot_interval: 1.6,
            boss_enrage_duration: 2.5,
            boss_shake_amplitude: 10.0,
            boss_phase2_shot_interval: 1.1,
            boss_minion_interval: 6.0,
            boss_volley_interval: 5.0,
            boss_volley_size: 5,
            boss_volley_shot_delay: 0.12,
            boss_death_duration: 2.0,
            boss_score: 500,
        }
    }
}

impl Tuning {
    /// Deserialize tuning from a JSON document, falling back to defaults
    /// for absent fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a pretty JSON document (for writing a template config).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
