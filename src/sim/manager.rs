//! Game manager: phase machine around the simulation
//!
//! Sole owner and writer of the asteroid and particle collections.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{Asteroid, GamePhase, GameState, Lives, Particle};
use super::tick::{Playfield, TickInput, TickReport, tick};
use crate::config::GameplayConfig;
use crate::mapper::ScreenPoint;

pub struct GameManager {
    config: GameplayConfig,
    playfield: Playfield,
    phase: GamePhase,
    state: GameState,
    rng: Pcg32,
}

impl GameManager {
    /// Create a manager in the menu phase. `seed` drives every random choice.
    pub fn new(config: &GameplayConfig, width: u32, height: u32, seed: u64) -> Self {
        Self {
            config: config.clone(),
            playfield: Playfield { width, height },
            phase: GamePhase::Menu,
            state: GameState::new(config),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn lives(&self) -> Lives {
        self.state.lives
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.state.asteroids
    }

    pub fn particles(&self) -> &[Particle] {
        &self.state.particles
    }

    pub fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Start (from Menu) or restart (from GameOver) with a fresh game.
    ///
    /// Ignored while already playing.
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Menu | GamePhase::GameOver => {
                self.reset();
                self.phase = GamePhase::Playing;
                log::info!("Game started");
            }
            GamePhase::Playing => {}
        }
    }

    /// Abort to the menu, discarding the current game
    pub fn return_to_menu(&mut self) {
        if self.phase != GamePhase::Menu {
            log::info!("Returning to menu (score {})", self.state.score);
        }
        self.reset();
        self.phase = GamePhase::Menu;
    }

    /// Restore the initial game state; the phase is left unchanged
    pub fn reset(&mut self) {
        self.state = GameState::new(&self.config);
    }

    /// Advance one tick while playing; a no-op in any other phase.
    pub fn update(&mut self, target: Option<ScreenPoint>) -> TickReport {
        if self.phase != GamePhase::Playing {
            return TickReport::default();
        }

        let input = TickInput { target };
        let report = tick(
            &mut self.state,
            &input,
            &self.config,
            self.playfield,
            &mut self.rng,
        );

        if report.missed > 0 {
            log::debug!(
                "{} asteroid(s) missed, lives {:?}",
                report.missed,
                self.state.lives
            );
        }
        if report.game_over {
            self.phase = GamePhase::GameOver;
            log::info!("Game over - final score {}", self.state.score);
        }
        report
    }
}
