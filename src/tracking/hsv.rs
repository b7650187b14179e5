//! HSV color space and binary color masks
//!
//! Uses the 8-bit OpenCV convention: hue in 0..180 (degrees / 2),
//! saturation and value in 0..=255.

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// Mask value for a matching pixel
pub const MASK_ON: u8 = 255;

/// Convert one RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h8 = (h / 2.0).round() as u32 % 180;
    [h8 as u8, s.round() as u8, max as u8]
}

/// Inclusive HSV bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// Named ball color presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallColor {
    Red,
    Green,
    Blue,
    Orange,
    Yellow,
    Any,
}

impl BallColor {
    /// HSV ranges for this preset. Red wraps around hue 0/180.
    pub fn ranges(&self) -> Vec<HsvRange> {
        match self {
            BallColor::Red => vec![
                HsvRange::new([0, 120, 70], [10, 255, 255]),
                HsvRange::new([170, 120, 70], [180, 255, 255]),
            ],
            BallColor::Green => vec![HsvRange::new([40, 50, 50], [80, 255, 255])],
            BallColor::Blue => vec![HsvRange::new([100, 100, 70], [130, 255, 255])],
            BallColor::Orange => vec![HsvRange::new([10, 100, 100], [25, 255, 255])],
            BallColor::Yellow => vec![HsvRange::new([20, 100, 100], [35, 255, 255])],
            BallColor::Any => vec![HsvRange::new([0, 50, 50], [180, 255, 255])],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BallColor::Red => "red",
            BallColor::Green => "green",
            BallColor::Blue => "blue",
            BallColor::Orange => "orange",
            BallColor::Yellow => "yellow",
            BallColor::Any => "any",
        }
    }
}

/// Binary mask of pixels inside any of the ranges
pub fn color_mask(frame: &RgbImage, ranges: &[HsvRange]) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for (x, y, px) in frame.enumerate_pixels() {
        let hsv = rgb_to_hsv(px[0], px[1], px[2]);
        if ranges.iter().any(|r| r.contains(hsv)) {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
    }
    mask
}

/// Fraction of set pixels in a mask (0 for an empty mask)
pub fn coverage(mask: &GrayImage) -> f32 {
    let total = mask.width() as usize * mask.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let on = mask.pixels().filter(|p| p[0] == MASK_ON).count();
    on as f32 / total as f32
}
