//! Camera space → screen space mapping
//!
//! Normalized camera coordinates have (0,0) at the top-left and (1,1) at the
//! bottom-right, the same orientation as the screen, so mapping is a plain
//! proportional scale followed by a clamp.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A pixel position on screen, always inside the screen bounds when produced
/// by [`CoordinateMapper::map_to_screen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    #[error("perspective calibration is not supported; mapping stays proportional")]
    CalibrationUnsupported,
}

/// A camera/screen correspondence used by calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
    pub camera: Vec2,
    pub screen: ScreenPoint,
}

/// Maps normalized camera coordinates to screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    width: u32,
    height: u32,
}

impl CoordinateMapper {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Scale a normalized point to screen pixels, clamped to the screen.
    ///
    /// Out-of-range input is clamped, not wrapped. NaN maps to 0.
    pub fn map_to_screen(&self, nx: f32, ny: f32) -> ScreenPoint {
        ScreenPoint {
            x: scale_axis(nx, self.width),
            y: scale_axis(ny, self.height),
        }
    }

    /// Screen pixels back to normalized coordinates
    pub fn inverse_map(&self, sx: i32, sy: i32) -> (f32, f32) {
        (sx as f32 / self.width as f32, sy as f32 / self.height as f32)
    }

    /// Perspective calibration hook.
    ///
    /// Not implemented: always returns [`MapperError::CalibrationUnsupported`]
    /// and leaves the mapping unchanged.
    pub fn calibrate(&mut self, points: &[Correspondence]) -> Result<(), MapperError> {
        log::debug!(
            "Calibration requested with {} points; unsupported",
            points.len()
        );
        Err(MapperError::CalibrationUnsupported)
    }

    pub fn is_calibrated(&self) -> bool {
        false
    }
}

#[inline]
fn scale_axis(n: f32, extent: u32) -> i32 {
    let max = extent as i64 - 1;
    // `as` saturates on overflow and maps NaN to 0
    let scaled = (n as f64 * extent as f64).round() as i64;
    scaled.clamp(0, max) as i32
}
