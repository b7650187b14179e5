//! Hand-landmark tracking: the index fingertip is the target

use image::{Rgb, RgbImage};

use super::overlay;
use super::{Frame, TrackedPoint, Tracker};
use crate::config::HandTrackerConfig;
use crate::consts::FINGERTIP_LANDMARK;
use crate::error::{StartupError, StartupResult, TrackerError};

/// Landmark position normalized to the frame (0-1 when inside it)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// Skeleton edges between the 21 hand landmarks
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    // thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // index
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // middle
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // ring
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    // palm
    (5, 9),
    (9, 13),
    (13, 17),
];

const LANDMARK_COLOR: Rgb<u8> = overlay::GREEN;
const CONNECTION_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Runs a hand-landmark model on a frame
pub trait LandmarkBackend {
    /// Receives the detection settings once, before the first frame
    fn configure(&mut self, _config: &HandTrackerConfig) {}

    /// Landmarks per detected hand, most prominent hand first
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Vec<Landmark>>, TrackerError>;

    fn close(&mut self) {}
}

pub struct HandTracker {
    backend: Box<dyn LandmarkBackend>,
    max_hands: usize,
    hands: Vec<Vec<Landmark>>,
    closed: bool,
}

impl HandTracker {
    pub fn new(
        config: &HandTrackerConfig,
        backend: Option<Box<dyn LandmarkBackend>>,
    ) -> StartupResult<Self> {
        if !config.model_path.is_file() {
            return Err(StartupError::MissingModelAsset(config.model_path.clone()));
        }
        let mut backend = backend.ok_or(StartupError::MissingBackend("hand"))?;
        backend.configure(config);

        log::info!(
            "Hand tracker: up to {} hand(s), detection {:.2}, tracking {:.2}",
            config.max_hands,
            config.detection_confidence,
            config.tracking_confidence
        );

        Ok(Self {
            backend,
            max_hands: config.max_hands as usize,
            hands: Vec::new(),
            closed: false,
        })
    }

    /// Landmarks from the last processed frame
    pub fn hands(&self) -> &[Vec<Landmark>] {
        &self.hands
    }
}

impl Tracker for HandTracker {
    fn name(&self) -> &'static str {
        "hand"
    }

    fn process_frame(&mut self, frame: &Frame) -> Option<TrackedPoint> {
        let detected = if self.closed {
            Err(TrackerError::Closed)
        } else {
            self.backend.detect(frame)
        };

        self.hands = match detected {
            Ok(mut hands) => {
                hands.truncate(self.max_hands);
                hands
            }
            Err(e) => {
                log::warn!("Hand detection skipped: {e}");
                Vec::new()
            }
        };

        let tip = self.hands.first()?.get(FINGERTIP_LANDMARK)?;
        TrackedPoint::from_normalized(tip.x, tip.y)
    }

    fn debug_image(&self, frame: &Frame) -> RgbImage {
        let mut out = frame.clone();
        let (w, h) = (frame.width() as f32, frame.height() as f32);
        let to_px = |l: &Landmark| ((l.x * w) as i32, (l.y * h) as i32);

        for hand in &self.hands {
            for landmark in hand {
                overlay::filled_circle(&mut out, to_px(landmark), 3, LANDMARK_COLOR);
            }
            for &(a, b) in &HAND_CONNECTIONS {
                if let (Some(start), Some(end)) = (hand.get(a), hand.get(b)) {
                    overlay::line(&mut out, to_px(start), to_px(end), 2, CONNECTION_COLOR);
                }
            }
        }
        out
    }

    fn close(&mut self) {
        if !self.closed {
            self.backend.close();
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HAND_LANDMARK_COUNT;
    use tempfile::NamedTempFile;

    struct Scripted(Vec<Result<Vec<Vec<Landmark>>, TrackerError>>);

    impl LandmarkBackend for Scripted {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Vec<Landmark>>, TrackerError> {
            if self.0.is_empty() {
                Ok(Vec::new())
            } else {
                self.0.remove(0)
            }
        }
    }

    fn hand_pointing_at(x: f32, y: f32) -> Vec<Landmark> {
        let mut hand = vec![Landmark { x: 0.5, y: 0.9 }; HAND_LANDMARK_COUNT];
        hand[FINGERTIP_LANDMARK] = Landmark { x, y };
        hand
    }

    fn tracker(script: Vec<Result<Vec<Vec<Landmark>>, TrackerError>>) -> (NamedTempFile, HandTracker) {
        let model = NamedTempFile::new().unwrap();
        let config = HandTrackerConfig {
            model_path: model.path().to_path_buf(),
            ..HandTrackerConfig::default()
        };
        let t = HandTracker::new(&config, Some(Box::new(Scripted(script)))).unwrap();
        (model, t)
    }

    #[test]
    fn test_fingertip_of_first_hand() {
        let (_m, mut t) = tracker(vec![Ok(vec![
            hand_pointing_at(0.25, 0.4),
            hand_pointing_at(0.9, 0.9),
        ])]);
        let frame = RgbImage::new(64, 48);
        let point = t.process_frame(&frame).unwrap();
        assert_eq!((point.x, point.y), (0.25, 0.4));
        // max_hands defaults to one
        assert_eq!(t.hands().len(), 1);
    }

    #[test]
    fn test_no_hand_or_error_is_no_detection() {
        let (_m, mut t) = tracker(vec![
            Ok(Vec::new()),
            Err(TrackerError::Inference("timeout".into())),
        ]);
        let frame = RgbImage::new(64, 48);
        assert_eq!(t.process_frame(&frame), None);
        assert_eq!(t.process_frame(&frame), None);
    }

    #[test]
    fn test_short_landmark_list_is_no_detection() {
        let (_m, mut t) = tracker(vec![Ok(vec![vec![Landmark { x: 0.1, y: 0.1 }]])]);
        let frame = RgbImage::new(64, 48);
        assert_eq!(t.process_frame(&frame), None);
        // Debug view still draws what it has
        let debug = t.debug_image(&frame);
        assert_eq!(*debug.get_pixel(6, 4), LANDMARK_COLOR);
    }

    #[test]
    fn test_debug_draws_skeleton() {
        let (_m, mut t) = tracker(vec![Ok(vec![hand_pointing_at(0.5, 0.1)])]);
        let frame = RgbImage::new(100, 100);
        t.process_frame(&frame);
        let debug = t.debug_image(&frame);
        // Midpoint of the vertical 7-8 segment (both at x=50)
        assert_eq!(*debug.get_pixel(50, 50), CONNECTION_COLOR);
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let config = HandTrackerConfig {
            model_path: "does/not/exist.task".into(),
            ..HandTrackerConfig::default()
        };
        let err = HandTracker::new(&config, None).err().unwrap();
        assert!(matches!(err, StartupError::MissingModelAsset(_)));
    }
}
