//! Fixed-step simulation tick
//!
//! Advances the game state by exactly one frame. The step order is fixed:
//! asteroids, particles, collisions, spawning, difficulty.

use glam::Vec2;
use rand::Rng;

use super::collision::asteroids_hit;
use super::state::{Asteroid, GameState, Particle};
use crate::config::GameplayConfig;
use crate::mapper::ScreenPoint;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Mapped target position; `None` when nothing was tracked this tick
    pub target: Option<ScreenPoint>,
}

/// Screen area asteroids fall through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playfield {
    pub width: u32,
    pub height: u32,
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub destroyed: u32,
    pub missed: u32,
    pub spawned: bool,
    pub difficulty_increased: bool,
    /// The last life was lost this tick
    pub game_over: bool,
}

/// Advance the game state by one tick.
///
/// Does nothing once the state is terminal.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    config: &GameplayConfig,
    playfield: Playfield,
    rng: &mut impl Rng,
) -> TickReport {
    let mut report = TickReport::default();
    if state.game_over {
        return report;
    }

    state.time_ticks += 1;

    report.missed = advance_asteroids(state, playfield);
    if state.game_over {
        report.game_over = true;
        return report;
    }

    advance_particles(state);

    if let Some(target) = input.target {
        report.destroyed = resolve_collisions(state, target.as_vec2(), config, rng);
    }

    state.ticks_since_spawn += 1;
    if state.ticks_since_spawn >= state.spawn_interval {
        spawn_asteroid(state, config, playfield, rng);
        state.ticks_since_spawn = 0;
        report.spawned = true;
    }

    report.difficulty_increased = update_difficulty(state, config);
    report
}

/// Move asteroids down and drop the ones that left the screen.
///
/// Every miss costs a life; running out sets the terminal flag.
/// Returns the number of asteroids missed.
fn advance_asteroids(state: &mut GameState, playfield: Playfield) -> u32 {
    for asteroid in &mut state.asteroids {
        asteroid.advance();
    }

    let before = state.asteroids.len();
    state
        .asteroids
        .retain(|a| !a.is_off_screen(playfield.height));
    let missed = (before - state.asteroids.len()) as u32;

    for _ in 0..missed {
        if state.lives.lose_one() {
            state.game_over = true;
        }
    }
    missed
}

/// Move particles and drop expired ones
fn advance_particles(state: &mut GameState) {
    for particle in &mut state.particles {
        particle.advance();
    }
    state.particles.retain(Particle::is_alive);
}

/// Destroy every asteroid under the target. Returns how many were destroyed.
fn resolve_collisions(
    state: &mut GameState,
    target: Vec2,
    config: &GameplayConfig,
    rng: &mut impl Rng,
) -> u32 {
    let hits = asteroids_hit(target, &state.asteroids);
    if hits.is_empty() {
        return 0;
    }

    for &idx in &hits {
        let asteroid = &mut state.asteroids[idx];
        asteroid.alive = false;
        let center = asteroid.pos;
        spawn_explosion(state, center, config, rng);
        state.score += 1;
    }
    state.asteroids.retain(|a| a.alive);

    hits.len() as u32
}

/// Burst of particles at a destruction point
fn spawn_explosion(state: &mut GameState, pos: Vec2, config: &GameplayConfig, rng: &mut impl Rng) {
    state.particles.reserve(config.particle_count as usize);
    for _ in 0..config.particle_count {
        state.particles.push(Particle::spawn(pos, config, rng));
    }
}

/// Spawn one asteroid above the top edge at a random x within the margins
pub fn spawn_asteroid(
    state: &mut GameState,
    config: &GameplayConfig,
    playfield: Playfield,
    rng: &mut impl Rng,
) {
    let margin = config.max_radius;
    let x_max = playfield.width.saturating_sub(margin).max(margin);
    let x = rng.random_range(margin..=x_max);
    let radius = rng.random_range(config.min_radius..=config.max_radius);
    let jitter = if config.speed_jitter > 0.0 {
        rng.random_range(-config.speed_jitter..=config.speed_jitter)
    } else {
        0.0
    };

    let id = state.next_entity_id();
    let pos = Vec2::new(x as f32, -(margin as f32));
    state
        .asteroids
        .push(Asteroid::new(id, pos, radius, state.asteroid_speed + jitter));
}

/// Step difficulty once the score has grown by the configured interval.
///
/// Scales at most once per tick regardless of how far the score jumped.
fn update_difficulty(state: &mut GameState, config: &GameplayConfig) -> bool {
    if state.score.saturating_sub(state.difficulty_baseline) < config.difficulty_interval {
        return false;
    }

    state.asteroid_speed *= config.speed_growth;
    state.spawn_interval = state
        .spawn_interval
        .saturating_sub(config.spawn_interval_step)
        .max(config.min_spawn_interval);
    state.difficulty_baseline = state.score;
    log::info!(
        "Difficulty up: speed {:.2}, spawn interval {}",
        state.asteroid_speed,
        state.spawn_interval
    );
    true
}
