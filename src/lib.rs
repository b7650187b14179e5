//! Asteroid Destroyer - a webcam-controlled arcade game
//!
//! Core modules:
//! - `tracking`: Camera frame → single normalized target (color, ML, hand strategies)
//! - `mapper`: Normalized camera coordinates → screen pixels
//! - `sim`: Deterministic game state machine (asteroids, particles, scoring, difficulty)
//! - `renderer`: Draw lists and the software rasterizer
//! - `app`: The per-tick orchestrator tying camera, tracker, game and display together

pub mod app;
pub mod camera;
pub mod config;
pub mod cursor;
pub mod display;
pub mod error;
pub mod mapper;
pub mod pacing;
pub mod renderer;
pub mod sim;
pub mod tracking;
pub mod ui;

pub use app::App;
pub use config::AppConfig;
pub use error::{ConfigError, StartupError, TrackerError};
pub use mapper::{CoordinateMapper, ScreenPoint};
pub use sim::{GameManager, GamePhase};
pub use tracking::{TrackedPoint, Tracker, build_tracker};

/// Fixed constants that are not meant to be tuned from configuration
pub mod consts {
    /// Floor for the spawn interval after difficulty scaling (ticks)
    pub const MIN_SPAWN_INTERVAL: u32 = 20;

    /// Explosion particle palette (RGB)
    pub const PARTICLE_COLORS: [[u8; 3]; 4] =
        [[255, 200, 0], [255, 150, 0], [255, 100, 0], [200, 50, 0]];
    /// Particle size range in pixels (inclusive)
    pub const PARTICLE_SIZE_RANGE: (u32, u32) = (2, 5);

    /// Input edge of the MobileNet-SSD detector
    pub const SSD_INPUT_SIZE: u32 = 300;
    /// Blob scale factor (1 / 127.5)
    pub const SSD_SCALE: f32 = 0.007843;
    /// Blob mean subtraction
    pub const SSD_MEAN: f32 = 127.5;
    /// Values per SSD detection row: image_id, class_id, confidence, x1, y1, x2, y2
    pub const SSD_ROW_LEN: usize = 7;

    /// Minimum share of box pixels that must match the color filter
    pub const COLOR_MATCH_RATIO: f32 = 0.2;

    /// Index fingertip in the 21-point hand landmark model
    pub const FINGERTIP_LANDMARK: usize = 8;
    /// Number of landmarks per detected hand
    pub const HAND_LANDMARK_COUNT: usize = 21;

    /// Number of frame times averaged by the FPS counter
    pub const FPS_SMOOTHING: usize = 10;
}

/// Convert an 8-bit RGB triple and alpha into a normalized vertex color
#[inline]
pub fn rgba(rgb: [u8; 3], alpha: f32) -> [f32; 4] {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        alpha,
    ]
}
