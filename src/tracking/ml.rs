//! Object-detection tracking (MobileNet-SSD style output)
//!
//! The network itself runs behind [`InferenceBackend`]; this module prepares
//! the input blob, decodes the detection rows and picks the target.

use std::path::Path;

use image::{RgbImage, imageops};

use super::hsv::{HsvRange, color_mask, coverage};
use super::overlay;
use super::{Frame, TrackedPoint, Tracker};
use crate::config::MlTrackerConfig;
use crate::consts::{COLOR_MATCH_RATIO, SSD_INPUT_SIZE, SSD_MEAN, SSD_ROW_LEN, SSD_SCALE};
use crate::error::{StartupError, StartupResult, TrackerError};

/// Network input tensor, CHW layout with channels in BGR order
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f32>,
}

/// Resize a frame to the detector input and normalize it into a blob
pub fn blob_from_frame(frame: &Frame) -> Blob {
    let size = SSD_INPUT_SIZE;
    let resized = imageops::resize(frame, size, size, imageops::FilterType::Triangle);
    let plane = (size * size) as usize;
    let mut data = vec![0.0; plane * 3];

    for (i, px) in resized.pixels().enumerate() {
        let [r, g, b] = px.0;
        for (c, v) in [b, g, r].into_iter().enumerate() {
            data[c * plane + i] = (v as f32 - SSD_MEAN) * SSD_SCALE;
        }
    }

    Blob {
        channels: 3,
        height: size as usize,
        width: size as usize,
        data,
    }
}

/// Runs the detection network on a blob
///
/// `forward` returns the flattened detection tensor: rows of
/// `[image_id, class_id, confidence, x1, y1, x2, y2]` with box corners
/// normalized to 0-1.
pub trait InferenceBackend {
    fn forward(&mut self, blob: &Blob) -> Result<Vec<f32>, TrackerError>;

    /// Release model resources. Called at most once per tracker close.
    fn close(&mut self) {}
}

/// Box corners in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Integer center, rounding toward negative infinity
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x1 + self.x2).div_euclid(2),
            (self.y1 + self.y2).div_euclid(2),
        )
    }

    /// Intersection with a `width` x `height` frame as (x, y, w, h), or
    /// `None` when nothing of the box lies inside
    pub fn clip(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x1.clamp(0, width as i32);
        let y1 = self.y1.clamp(0, height as i32);
        let x2 = self.x2.clamp(0, width as i32);
        let y2 = self.y2.clamp(0, height as i32);
        (x2 > x1 && y2 > y1).then(|| {
            (
                x1 as u32,
                y1 as u32,
                (x2 - x1) as u32,
                (y2 - y1) as u32,
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: i64,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Decode raw detector output into boxes scaled to a frame
pub fn decode_ssd(output: &[f32], width: u32, height: u32) -> Result<Vec<Detection>, TrackerError> {
    if output.len() % SSD_ROW_LEN != 0 {
        return Err(TrackerError::MalformedOutput {
            len: output.len(),
            row_len: SSD_ROW_LEN,
        });
    }

    let (w, h) = (width as f32, height as f32);
    Ok(output
        .chunks_exact(SSD_ROW_LEN)
        .map(|row| Detection {
            class_id: row[1] as i64,
            confidence: row[2],
            bbox: BoundingBox {
                x1: (row[3] * w) as i32,
                y1: (row[4] * h) as i32,
                x2: (row[5] * w) as i32,
                y2: (row[6] * h) as i32,
            },
        })
        .collect())
}

pub struct MlTracker {
    backend: Box<dyn InferenceBackend>,
    confidence_threshold: f32,
    target_class: i64,
    color_filter: Option<Vec<HsvRange>>,
    /// Candidates from the last frame, for the debug view
    candidates: Vec<Detection>,
    best: Option<Detection>,
    closed: bool,
}

fn require_asset(path: &Path) -> StartupResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StartupError::MissingModelAsset(path.to_path_buf()))
    }
}

impl MlTracker {
    /// Check that both model files exist, then wrap the backend.
    pub fn new(
        config: &MlTrackerConfig,
        backend: Option<Box<dyn InferenceBackend>>,
    ) -> StartupResult<Self> {
        require_asset(&config.model_description)?;
        require_asset(&config.model_weights)?;
        let backend = backend.ok_or(StartupError::MissingBackend("ml"))?;

        log::info!(
            "ML tracker: class {}, confidence > {}, color filter {}",
            config.target_class,
            config.confidence_threshold,
            config.color_filter.map_or("off", |c| c.as_str())
        );

        Ok(Self {
            backend,
            confidence_threshold: config.confidence_threshold,
            target_class: config.target_class as i64,
            color_filter: config.color_filter.map(|c| c.ranges()),
            candidates: Vec::new(),
            best: None,
            closed: false,
        })
    }

    /// Whether enough of the box matches the filter color
    fn color_matches(&self, frame: &Frame, bbox: &BoundingBox) -> bool {
        let Some(ranges) = &self.color_filter else {
            return true;
        };
        let Some((x, y, w, h)) = bbox.clip(frame.width(), frame.height()) else {
            return false;
        };
        let roi = imageops::crop_imm(frame, x, y, w, h).to_image();
        coverage(&color_mask(&roi, ranges)) >= COLOR_MATCH_RATIO
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, TrackerError> {
        if self.closed {
            return Err(TrackerError::Closed);
        }
        let blob = blob_from_frame(frame);
        let output = self.backend.forward(&blob)?;
        let detections = decode_ssd(&output, frame.width(), frame.height())?;

        self.candidates = detections
            .into_iter()
            .filter(|d| d.class_id == self.target_class && d.confidence > self.confidence_threshold)
            .collect();

        let mut best: Option<Detection> = None;
        for det in &self.candidates {
            if !self.color_matches(frame, &det.bbox) {
                continue;
            }
            if best.is_none_or(|b| det.confidence > b.confidence) {
                best = Some(*det);
            }
        }
        Ok(best)
    }
}

impl Tracker for MlTracker {
    fn name(&self) -> &'static str {
        "ml"
    }

    fn process_frame(&mut self, frame: &Frame) -> Option<TrackedPoint> {
        self.best = match self.detect(frame) {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Detection skipped: {e}");
                self.candidates.clear();
                None
            }
        };

        let (cx, cy) = self.best?.bbox.center();
        TrackedPoint::from_normalized(
            cx as f32 / frame.width() as f32,
            cy as f32 / frame.height() as f32,
        )
    }

    fn debug_image(&self, frame: &Frame) -> RgbImage {
        let mut out = frame.clone();
        for det in &self.candidates {
            let b = det.bbox;
            overlay::rect_outline(&mut out, (b.x1, b.y1), (b.x2, b.y2), 1, overlay::YELLOW);
        }
        if let Some(best) = self.best {
            let b = best.bbox;
            overlay::rect_outline(&mut out, (b.x1, b.y1), (b.x2, b.y2), 3, overlay::GREEN);
            let center = b.center();
            overlay::filled_circle(&mut out, center, 8, overlay::RED);
            overlay::circle_outline(&mut out, center, 10, 2, overlay::WHITE);
        }
        out
    }

    fn close(&mut self) {
        if !self.closed {
            self.backend.close();
            self.closed = true;
            log::debug!("ML tracker closed");
        }
    }
}
