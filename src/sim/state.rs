//! Game state and entity types
//!
//! Everything the game manager mutates lives here. Rendering reads these
//! types but never writes them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameplayConfig;
use crate::consts::{PARTICLE_COLORS, PARTICLE_SIZE_RANGE};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Title screen, waiting for start
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended; waiting for restart or menu
    GameOver,
}

/// Remaining lives, or no limit at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lives {
    Limited(u32),
    Unlimited,
}

impl Lives {
    pub fn from_config(config: &GameplayConfig) -> Self {
        if config.lives_enabled {
            Lives::Limited(config.initial_lives)
        } else {
            Lives::Unlimited
        }
    }

    /// Remaining count when lives are limited
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Lives::Limited(n) => Some(*n),
            Lives::Unlimited => None,
        }
    }

    /// Lose one life; returns true when none are left
    pub fn lose_one(&mut self) -> bool {
        match self {
            Lives::Limited(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
            Lives::Unlimited => false,
        }
    }
}

/// A falling asteroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    /// Fixed after creation
    pub radius: u32,
    /// Fall speed in pixels per tick
    pub speed: f32,
    pub alive: bool,
}

impl Asteroid {
    pub fn new(id: u32, pos: Vec2, radius: u32, speed: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            speed,
            alive: true,
        }
    }

    /// Move one tick downward
    pub fn advance(&mut self) {
        self.pos.y += self.speed;
    }

    /// True once the top edge has passed the bottom of the screen
    pub fn is_off_screen(&self, screen_height: u32) -> bool {
        self.pos.y - self.radius as f32 > screen_height as f32
    }
}

/// An explosion particle (visual only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime in ticks
    pub lifetime: u32,
    pub max_lifetime: u32,
    pub color: [u8; 3],
    pub size: u32,
}

impl Particle {
    /// Spawn a particle at `pos` with a random direction, speed, color and size
    pub fn spawn(pos: Vec2, config: &GameplayConfig, rng: &mut impl Rng) -> Self {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = if config.particle_speed.min < config.particle_speed.max {
            rng.random_range(config.particle_speed.min..=config.particle_speed.max)
        } else {
            config.particle_speed.min
        };
        let color = PARTICLE_COLORS[rng.random_range(0..PARTICLE_COLORS.len())];
        let size = rng.random_range(PARTICLE_SIZE_RANGE.0..=PARTICLE_SIZE_RANGE.1);

        Self {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            lifetime: config.particle_lifetime,
            max_lifetime: config.particle_lifetime,
            color,
            size,
        }
    }

    /// Move and age by one tick
    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0
    }

    /// Remaining life as a 0-1 fraction, for fading
    pub fn life_fraction(&self) -> f32 {
        if self.max_lifetime == 0 {
            0.0
        } else {
            self.lifetime as f32 / self.max_lifetime as f32
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u32,
    pub lives: Lives,
    /// Current base fall speed
    pub asteroid_speed: f32,
    /// Current ticks between spawns
    pub spawn_interval: u32,
    pub ticks_since_spawn: u32,
    /// Score at the last difficulty step
    pub difficulty_baseline: u32,
    /// Ticks simulated since reset
    pub time_ticks: u64,
    /// Terminal flag: set when the last life is lost
    pub game_over: bool,
    /// Live asteroids (in spawn order)
    pub asteroids: Vec<Asteroid>,
    /// Visual particles
    pub particles: Vec<Particle>,
    /// Next asteroid ID
    next_id: u32,
}

impl GameState {
    /// Fresh state from configuration
    pub fn new(config: &GameplayConfig) -> Self {
        Self {
            score: 0,
            lives: Lives::from_config(config),
            asteroid_speed: config.initial_speed,
            spawn_interval: config.spawn_interval,
            ticks_since_spawn: 0,
            difficulty_baseline: 0,
            time_ticks: 0,
            game_over: false,
            asteroids: Vec::new(),
            particles: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_lives_saturate_at_zero() {
        let mut lives = Lives::Limited(1);
        assert!(lives.lose_one());
        assert!(lives.lose_one());
        assert_eq!(lives.remaining(), Some(0));

        let mut unlimited = Lives::Unlimited;
        assert!(!unlimited.lose_one());
        assert_eq!(unlimited.remaining(), None);
    }

    #[test]
    fn test_asteroid_off_screen_uses_top_edge() {
        let mut asteroid = Asteroid::new(1, Vec2::new(100.0, 700.0), 20, 5.0);
        assert!(!asteroid.is_off_screen(720));
        asteroid.pos.y = 740.0;
        assert!(!asteroid.is_off_screen(720));
        asteroid.advance();
        assert!(asteroid.is_off_screen(720));
    }

    #[test]
    fn test_particle_spawn_within_config() {
        let config = GameplayConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let p = Particle::spawn(Vec2::ZERO, &config, &mut rng);
            let speed = p.vel.length();
            assert!(speed >= 2.0 - 1e-3 && speed <= 6.0 + 1e-3);
            assert!((2..=5).contains(&p.size));
            assert!(PARTICLE_COLORS.contains(&p.color));
            assert_eq!(p.lifetime, config.particle_lifetime);
        }
    }
}
