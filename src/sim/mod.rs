//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, camera or platform dependencies

pub mod collision;
pub mod manager;
pub mod state;
pub mod tick;

pub use collision::{asteroids_hit, point_in_circle, target_hits_asteroid};
pub use manager::GameManager;
pub use state::{Asteroid, GamePhase, GameState, Lives, Particle};
pub use tick::{Playfield, TickInput, TickReport, spawn_asteroid, tick};
