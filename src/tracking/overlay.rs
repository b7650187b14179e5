//! Drawing helpers for tracker debug views
//!
//! All primitives clip against the image bounds, so callers may pass
//! coordinates partly or fully outside the frame.

use image::{GrayImage, Rgb, RgbImage};

use super::hsv::MASK_ON;

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[inline]
fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Filled square of side `2 * half + 1` centered on a point
fn dot(img: &mut RgbImage, x: i32, y: i32, half: i32, color: Rgb<u8>) {
    for dy in -half..=half {
        for dx in -half..=half {
            put(img, x + dx, y + dy, color);
        }
    }
}

/// Axis-aligned rectangle outline, growing inward by `thickness`
pub fn rect_outline(
    img: &mut RgbImage,
    (x1, y1): (i32, i32),
    (x2, y2): (i32, i32),
    thickness: i32,
    color: Rgb<u8>,
) {
    let (x1, x2) = (x1.min(x2), x1.max(x2));
    let (y1, y2) = (y1.min(y2), y1.max(y2));
    for t in 0..thickness.max(1) {
        for x in x1..=x2 {
            put(img, x, y1 + t, color);
            put(img, x, y2 - t, color);
        }
        for y in y1..=y2 {
            put(img, x1 + t, y, color);
            put(img, x2 - t, y, color);
        }
    }
}

pub fn filled_circle(img: &mut RgbImage, (cx, cy): (i32, i32), radius: i32, color: Rgb<u8>) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

pub fn circle_outline(
    img: &mut RgbImage,
    (cx, cy): (i32, i32),
    radius: i32,
    thickness: i32,
    color: Rgb<u8>,
) {
    let outer = radius + thickness / 2;
    let inner = (radius - (thickness - 1) / 2 - 1).max(0);
    let (o2, i2) = (outer * outer, inner * inner);
    for dy in -outer..=outer {
        for dx in -outer..=outer {
            let d2 = dx * dx + dy * dy;
            if d2 <= o2 && d2 > i2 {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Line segment (Bresenham) drawn with a square pen
pub fn line(
    img: &mut RgbImage,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    thickness: i32,
    color: Rgb<u8>,
) {
    let half = (thickness.max(1) - 1) / 2;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        dot(img, x, y, half, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Keep masked pixels at full brightness and dim the rest to a quarter
pub fn highlight_mask(frame: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = frame.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let on = mask
            .get_pixel_checked(x, y)
            .is_some_and(|m| m[0] == MASK_ON);
        if !on {
            px.0 = px.0.map(|c| c / 4);
        }
    }
    out
}
