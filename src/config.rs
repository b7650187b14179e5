//! Game configuration
//!
//! One explicit structure passed by reference into every component's
//! constructor. Loaded from JSON; every section falls back to its defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::MIN_SPAWN_INTERVAL;
use crate::error::ConfigError;
use crate::tracking::hsv::{BallColor, HsvRange};

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Ticks per second the loop is paced to
    pub target_fps: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            target_fps: 60,
        }
    }
}

/// Channel order of the decoded frames. `Bgr` swaps red and blue on capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Bgr,
    #[default]
    Rgb,
}

/// Camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Video device index; also selects `cam<index>` inside `source_dir`
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub channel_order: ChannelOrder,
    /// Replay PNG captures from this directory instead of a live device
    pub source_dir: Option<PathBuf>,
    /// Flip frames horizontally so the view behaves like a mirror
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            channel_order: ChannelOrder::Rgb,
            source_dir: None,
            mirror: true,
        }
    }
}

/// Which detection strategy drives the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStrategy {
    #[default]
    Color,
    Ml,
    Hand,
}

impl TrackingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStrategy::Color => "color",
            TrackingStrategy::Ml => "ml",
            TrackingStrategy::Hand => "hand",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "color" | "colour" => Some(TrackingStrategy::Color),
            "ml" | "ssd" => Some(TrackingStrategy::Ml),
            "hand" => Some(TrackingStrategy::Hand),
            _ => None,
        }
    }
}

/// Color-threshold strategy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTrackerConfig {
    /// Union of HSV ranges that count as the target color
    pub ranges: Vec<HsvRange>,
    /// Regions smaller than this many pixels are ignored
    pub min_area: u32,
}

impl Default for ColorTrackerConfig {
    fn default() -> Self {
        Self {
            ranges: BallColor::Orange.ranges(),
            min_area: 300,
        }
    }
}

/// ML-detection strategy settings (MobileNet-SSD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlTrackerConfig {
    pub model_description: PathBuf,
    pub model_weights: PathBuf,
    /// Detections at or below this confidence are discarded
    pub confidence_threshold: f32,
    /// Detector class id of the target ("sports ball")
    pub target_class: u32,
    /// Secondary color re-validation of each box (None = disabled)
    pub color_filter: Option<BallColor>,
}

impl Default for MlTrackerConfig {
    fn default() -> Self {
        Self {
            model_description: PathBuf::from("models/MobileNetSSD_deploy.prototxt"),
            model_weights: PathBuf::from("models/MobileNetSSD_deploy.caffemodel"),
            confidence_threshold: 0.3,
            target_class: 37,
            color_filter: None,
        }
    }
}

/// Hand-landmark strategy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandTrackerConfig {
    pub model_path: PathBuf,
    pub max_hands: u32,
    pub detection_confidence: f32,
    pub tracking_confidence: f32,
}

impl Default for HandTrackerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/hand_landmarker.task"),
            max_hands: 1,
            detection_confidence: 0.7,
            tracking_confidence: 0.5,
        }
    }
}

/// Tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub strategy: TrackingStrategy,
    pub color: ColorTrackerConfig,
    pub ml: MlTrackerConfig,
    pub hand: HandTrackerConfig,
    /// Reserved; tracking output is not smoothed
    pub smoothing_factor: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            strategy: TrackingStrategy::Color,
            color: ColorTrackerConfig::default(),
            ml: MlTrackerConfig::default(),
            hand: HandTrackerConfig::default(),
            smoothing_factor: 0.5,
        }
    }
}

/// Inclusive min/max pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Base fall speed in pixels per tick
    pub initial_speed: f32,
    /// Ticks between spawns at the start of a game
    pub spawn_interval: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Symmetric random offset applied to each asteroid's speed
    pub speed_jitter: f32,

    // === Difficulty ===
    /// Score gained between difficulty steps
    pub difficulty_interval: u32,
    /// Speed multiplier per difficulty step (> 1)
    pub speed_growth: f32,
    /// Spawn interval reduction per difficulty step
    pub spawn_interval_step: u32,
    pub min_spawn_interval: u32,

    // === Lives ===
    pub lives_enabled: bool,
    pub initial_lives: u32,

    // === Particles ===
    pub particle_count: u32,
    /// Particle lifetime in ticks
    pub particle_lifetime: u32,
    pub particle_speed: Range<f32>,

    // === Cursor ===
    pub cursor_radius: u32,
    pub trail_length: usize,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            initial_speed: 2.0,
            spawn_interval: 60,
            min_radius: 50,
            max_radius: 100,
            speed_jitter: 0.5,

            difficulty_interval: 10,
            speed_growth: 1.1,
            spawn_interval_step: 5,
            min_spawn_interval: MIN_SPAWN_INTERVAL,

            lives_enabled: true,
            initial_lives: 3,

            particle_count: 15,
            particle_lifetime: 30,
            particle_speed: Range { min: 2.0, max: 6.0 },

            cursor_radius: 30,
            trail_length: 10,
        }
    }
}

/// Image assets loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Background image, scaled to the screen
    pub background: Option<PathBuf>,
    /// Sprite drawn in place of the plain asteroid circle
    pub asteroid_sprite: Option<PathBuf>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub screen: ScreenConfig,
    pub camera: CameraConfig,
    pub tracker: TrackerConfig,
    pub gameplay: GameplayConfig,
    pub assets: AssetConfig,
    /// Start with the picture-in-picture tracker view visible
    pub debug_overlay: bool,
}

impl AppConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&data)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON (used to write a starter config)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems: Vec<String> = Vec::new();
        let s = &self.screen;
        let g = &self.gameplay;

        if s.width == 0 || s.height == 0 {
            problems.push("screen dimensions must be > 0".into());
        }
        if s.target_fps == 0 {
            problems.push("screen.target_fps must be > 0".into());
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            problems.push("camera dimensions must be > 0".into());
        }
        if g.min_radius == 0 || g.min_radius > g.max_radius {
            problems.push(format!(
                "asteroid radius range {}..={} is empty or zero",
                g.min_radius, g.max_radius
            ));
        }
        if u64::from(g.max_radius) * 2 > u64::from(s.width) {
            problems.push(format!(
                "playfield width {} is narrower than two max radii ({})",
                s.width, g.max_radius
            ));
        }
        if g.spawn_interval == 0 || g.min_spawn_interval == 0 {
            problems.push("spawn intervals must be > 0".into());
        }
        if g.speed_growth <= 1.0 {
            problems.push(format!("speed_growth {} must be > 1", g.speed_growth));
        }
        if g.speed_jitter < 0.0 || g.speed_jitter >= g.initial_speed {
            problems.push(format!(
                "speed_jitter {} must be >= 0 and below initial_speed {}",
                g.speed_jitter, g.initial_speed
            ));
        }
        if g.difficulty_interval == 0 {
            problems.push("difficulty_interval must be > 0".into());
        }
        if g.particle_speed.min > g.particle_speed.max {
            problems.push("particle_speed.min exceeds particle_speed.max".into());
        }
        if g.lives_enabled && g.initial_lives == 0 {
            problems.push("initial_lives must be > 0 when lives are enabled".into());
        }
        if g.trail_length == 0 {
            problems.push("trail_length must be > 0".into());
        }
        if !(0.0..=1.0).contains(&self.tracker.ml.confidence_threshold) {
            problems.push("tracker.ml.confidence_threshold must be within 0..=1".into());
        }
        if self.tracker.color.ranges.is_empty() {
            problems.push("tracker.color.ranges must not be empty".into());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.screen.target_fps, 60);
        assert_eq!(config.gameplay.min_spawn_interval, 20);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{ "gameplay": { "initial_lives": 5 }, "tracker": { "strategy": "ml" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.gameplay.initial_lives, 5);
        assert_eq!(config.gameplay.spawn_interval, 60);
        assert_eq!(config.tracker.strategy, TrackingStrategy::Ml);
        assert_eq!(config.screen.width, 1280);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = AppConfig::default();
        config.gameplay.min_radius = 120;
        config.gameplay.speed_growth = 1.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("radius"));
        assert!(err.contains("speed_growth"));
    }

    #[test]
    fn test_load_roundtrip_through_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut config = AppConfig::default();
        config.debug_overlay = true;
        write!(file, "{}", config.to_json().unwrap()).unwrap();

        let loaded = AppConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = AppConfig::load("/nonexistent/asteroid-destroyer.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(TrackingStrategy::from_str("ML"), Some(TrackingStrategy::Ml));
        assert_eq!(TrackingStrategy::from_str("hand"), Some(TrackingStrategy::Hand));
        assert_eq!(TrackingStrategy::from_str("laser"), None);
    }
}
