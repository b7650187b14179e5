//! Target tracking
//!
//! A tracker turns one camera frame into at most one normalized target
//! position. Strategies are chosen once from configuration and used through
//! the [`Tracker`] trait.

pub mod color;
pub mod hand;
pub mod hsv;
pub mod ml;
pub mod overlay;
pub mod regions;

use image::RgbImage;

pub use color::ColorTracker;
pub use hand::{HandTracker, Landmark, LandmarkBackend};
pub use hsv::{BallColor, HsvRange};
pub use ml::{Blob, InferenceBackend, MlTracker};

use crate::config::{TrackerConfig, TrackingStrategy};
use crate::error::StartupResult;

/// Camera frame in RGB channel order
pub type Frame = RgbImage;

/// Target position normalized to the frame, both axes in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPoint {
    pub x: f32,
    pub y: f32,
}

impl TrackedPoint {
    /// Clamp into [0, 1]; non-finite input is no detection
    pub fn from_normalized(x: f32, y: f32) -> Option<Self> {
        (x.is_finite() && y.is_finite()).then(|| Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        })
    }
}

pub trait Tracker {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// Locate the target in this frame, if any
    fn process_frame(&mut self, frame: &Frame) -> Option<TrackedPoint>;

    /// Visualize detections on a copy of the frame
    fn debug_image(&self, frame: &Frame) -> RgbImage;

    /// Release backend resources; safe to call more than once
    fn close(&mut self);
}

/// Model runtimes for the strategies that need one
#[derive(Default)]
pub struct Backends {
    pub inference: Option<Box<dyn InferenceBackend>>,
    pub landmarks: Option<Box<dyn LandmarkBackend>>,
}

/// Build the tracker selected by `config.strategy`
pub fn build_tracker(config: &TrackerConfig, backends: Backends) -> StartupResult<Box<dyn Tracker>> {
    let tracker: Box<dyn Tracker> = match config.strategy {
        TrackingStrategy::Color => Box::new(ColorTracker::new(&config.color)),
        TrackingStrategy::Ml => Box::new(MlTracker::new(&config.ml, backends.inference)?),
        TrackingStrategy::Hand => Box::new(HandTracker::new(&config.hand, backends.landmarks)?),
    };
    log::info!("Tracking strategy: {}", tracker.name());
    Ok(tracker)
}
