//! Color-threshold tracking
//!
//! Pipeline: HSV mask from the configured ranges, speckle removal, largest
//! 8-connected region, centroid.

use image::{GrayImage, RgbImage};

use super::hsv::{HsvRange, color_mask};
use super::overlay;
use super::regions::{Region, find_regions, largest_region, open_mask};
use super::{Frame, TrackedPoint, Tracker};
use crate::config::ColorTrackerConfig;

pub struct ColorTracker {
    ranges: Vec<HsvRange>,
    min_area: u32,
    closed: bool,
}

/// Outcome of one color pass over a frame
struct Blob {
    mask: GrayImage,
    region: Option<Region>,
}

impl ColorTracker {
    pub fn new(config: &ColorTrackerConfig) -> Self {
        log::debug!(
            "Color tracker: {} HSV range(s), min area {}",
            config.ranges.len(),
            config.min_area
        );
        Self {
            ranges: config.ranges.clone(),
            min_area: config.min_area,
            closed: false,
        }
    }

    fn scan(&self, frame: &Frame) -> Blob {
        let mask = open_mask(&color_mask(frame, &self.ranges));
        let region = largest_region(&find_regions(&mask));
        Blob { mask, region }
    }

    fn qualifies(&self, region: &Region) -> bool {
        region.area >= self.min_area
    }
}

impl Tracker for ColorTracker {
    fn name(&self) -> &'static str {
        "color"
    }

    fn process_frame(&mut self, frame: &Frame) -> Option<TrackedPoint> {
        if self.closed {
            return None;
        }
        let region = self.scan(frame).region?;
        if !self.qualifies(&region) {
            return None;
        }
        let (cx, cy) = region.centroid()?;
        TrackedPoint::from_normalized(cx / frame.width() as f32, cy / frame.height() as f32)
    }

    fn debug_image(&self, frame: &Frame) -> RgbImage {
        let blob = self.scan(frame);
        let mut out = overlay::highlight_mask(frame, &blob.mask);

        if let Some(region) = blob.region {
            let color = if self.qualifies(&region) {
                overlay::GREEN
            } else {
                overlay::YELLOW
            };
            overlay::rect_outline(
                &mut out,
                (region.min_x as i32, region.min_y as i32),
                (region.max_x as i32, region.max_y as i32),
                2,
                color,
            );
            if let Some((cx, cy)) = region.centroid() {
                let center = (cx as i32, cy as i32);
                overlay::filled_circle(&mut out, center, 5, overlay::RED);
            }
        }
        out
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            log::debug!("Color tracker closed");
        }
    }
}
