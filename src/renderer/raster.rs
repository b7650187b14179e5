//! Software rasterizer: turns a [`Scene`] into an RGBA frame
//!
//! Triangles are sampled at pixel centers with a top-left style tie rule, so
//! fans and strips never blend a shared edge twice. Colors are straight alpha,
//! composited source-over onto an opaque canvas.

use std::collections::HashMap;

use glam::Vec2;
use image::{RgbaImage, imageops};

use super::assets::Assets;
use super::scene::{PictureInPicture, Primitive, Scene, SpriteId, SpriteItem};
use super::vertex::{Vertex, colors};

#[inline]
fn blend(dst: &mut [u8; 4], src: [f32; 4]) {
    let a = src[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let s = src[c].clamp(0.0, 1.0) * 255.0;
        let d = dst[c] as f32;
        dst[c] = (s * a + d * (1.0 - a)).round() as u8;
    }
    dst[3] = 255;
}

/// Signed edge function. Evaluated from the lexicographically smaller
/// endpoint so that `edge(a, b, p) == -edge(b, a, p)` holds exactly.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let raw = |a: Vec2, b: Vec2| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if (a.x, a.y) <= (b.x, b.y) {
        raw(a, b)
    } else {
        -raw(b, a)
    }
}

/// Whether a sample exactly on edge a->b belongs to this triangle.
/// Reversing the edge flips the answer, so neighbors never both own it.
#[inline]
fn owns_edge(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    d.y > 0.0 || (d.y == 0.0 && d.x < 0.0)
}

pub fn fill_triangle(canvas: &mut RgbaImage, tri: [&Vertex; 3]) {
    let mut p = tri.map(|v| Vec2::from(v.position));
    let mut col = tri.map(|v| v.color);
    let mut area = edge(p[0], p[1], p[2]);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    if area < 0.0 {
        p.swap(1, 2);
        col.swap(1, 2);
        area = -area;
    }

    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let min = p[0].min(p[1]).min(p[2]).max(Vec2::ZERO).floor();
    let max = p[0].max(p[1]).max(p[2]).min(Vec2::new(w, h)).ceil();
    if min.x >= max.x || min.y >= max.y {
        return;
    }

    let owns = [
        owns_edge(p[1], p[2]),
        owns_edge(p[2], p[0]),
        owns_edge(p[0], p[1]),
    ];

    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let s = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let wts = [edge(p[1], p[2], s), edge(p[2], p[0], s), edge(p[0], p[1], s)];
            let inside = wts
                .iter()
                .zip(owns)
                .all(|(&e, own)| e > 0.0 || (e == 0.0 && own));
            if !inside {
                continue;
            }
            let mut color = [0.0; 4];
            for (k, c) in color.iter_mut().enumerate() {
                *c = (wts[0] * col[0][k] + wts[1] * col[1][k] + wts[2] * col[2][k]) / area;
            }
            blend(&mut canvas.get_pixel_mut(x, y).0, color);
        }
    }
}

/// Draw an image at an integer offset, clipping to the canvas
fn blit(canvas: &mut RgbaImage, img: &RgbaImage, x0: i64, y0: i64) {
    for (sx, sy, px) in img.enumerate_pixels() {
        let (x, y) = (x0 + sx as i64, y0 + sy as i64);
        if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
            continue;
        }
        let [r, g, b, a] = px.0;
        let src = [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ];
        blend(&mut canvas.get_pixel_mut(x as u32, y as u32).0, src);
    }
}

/// Reusable rasterizer; keeps scaled sprites between frames
#[derive(Default)]
pub struct Rasterizer {
    sprite_cache: HashMap<(SpriteId, u32), RgbaImage>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, scene: &Scene, assets: &Assets) -> RgbaImage {
        let mut canvas = match &assets.background {
            Some(bg) if bg.dimensions() == (scene.width, scene.height) => bg.clone(),
            Some(bg) => imageops::resize(
                bg,
                scene.width,
                scene.height,
                imageops::FilterType::Triangle,
            ),
            None => {
                let [r, g, b] = colors::BACKGROUND;
                RgbaImage::from_pixel(scene.width, scene.height, image::Rgba([r, g, b, 255]))
            }
        };

        for primitive in scene.draw_list.iter() {
            match primitive {
                Primitive::Triangles(vertices) => {
                    for tri in vertices.chunks_exact(3) {
                        fill_triangle(&mut canvas, [&tri[0], &tri[1], &tri[2]]);
                    }
                }
                Primitive::Sprite(item) => self.draw_sprite(&mut canvas, item, assets),
                Primitive::Text(_) => {}
            }
        }

        if let Some(pip) = &scene.pip {
            draw_pip(&mut canvas, pip);
        }
        canvas
    }

    fn draw_sprite(&mut self, canvas: &mut RgbaImage, item: &SpriteItem, assets: &Assets) {
        let Some(source) = assets.sprite(item.sprite) else {
            return;
        };
        if item.size == 0 {
            return;
        }
        let scaled = self
            .sprite_cache
            .entry((item.sprite, item.size))
            .or_insert_with(|| {
                imageops::resize(source, item.size, item.size, imageops::FilterType::Triangle)
            });
        let half = item.size as f32 / 2.0;
        blit(
            canvas,
            scaled,
            (item.center.x - half) as i64,
            (item.center.y - half) as i64,
        );
    }
}

fn draw_pip(canvas: &mut RgbaImage, pip: &PictureInPicture) {
    let rgba = image::DynamicImage::ImageRgb8(pip.image.clone()).to_rgba8();
    blit(canvas, &rgba, pip.x as i64, pip.y as i64);

    let (w, h) = pip.image.dimensions();
    let [r, g, b] = pip.border;
    let color = image::Rgba([r, g, b, 255]);
    for dy in 0..h {
        for dx in 0..w {
            let on_border = dx < pip.border_width
                || dy < pip.border_width
                || dx + pip.border_width >= w
                || dy + pip.border_width >= h;
            let (x, y) = (pip.x + dx, pip.y + dy);
            if on_border && x < canvas.width() && y < canvas.height() {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::scene::Layer;
    use crate::renderer::shapes;
    use crate::rgba;
    use image::{Rgb, RgbImage, Rgba};

    fn scene_with(vertices: Vec<Vertex>) -> Scene {
        let mut scene = Scene::new(32, 32);
        scene.draw_list.set_layer(Layer::Asteroids);
        scene.draw_list.triangles(vertices);
        scene
    }

    #[test]
    fn test_empty_scene_is_background_color() {
        let frame = Rasterizer::new().render(&Scene::new(8, 8), &Assets::default());
        let [r, g, b] = colors::BACKGROUND;
        assert_eq!(*frame.get_pixel(4, 4), Rgba([r, g, b, 255]));
    }

    #[test]
    fn test_opaque_rect_covers_exact_pixels() {
        let verts = shapes::rect(Vec2::new(4.0, 4.0), Vec2::new(8.0, 6.0), [1.0; 4]);
        let frame = Rasterizer::new().render(&scene_with(verts), &Assets::default());
        let white = frame.pixels().filter(|p| p.0 == [255, 255, 255, 255]).count();
        assert_eq!(white, 8);
        assert_eq!(frame.get_pixel(4, 4).0, [255, 255, 255, 255]);
        assert_ne!(frame.get_pixel(8, 4).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_translucent_fan_has_no_seams() {
        let verts = shapes::circle(Vec2::new(16.0, 16.0), 10.0, rgba([255, 255, 255], 0.4), 16);
        let frame = Rasterizer::new().render(&scene_with(verts), &Assets::default());
        // Every covered pixel received exactly one blend: 255 * 0.4 + 10 * 0.6
        let [r, ..] = colors::BACKGROUND;
        let inside: Vec<u8> = frame
            .pixels()
            .map(|p| p.0[0])
            .filter(|&c| c != r)
            .collect();
        assert!(inside.len() > 200);
        assert!(inside.iter().all(|&c| c.abs_diff(108) <= 1));
    }

    #[test]
    fn test_offscreen_triangles_are_clipped() {
        let verts = shapes::circle(Vec2::new(-100.0, 500.0), 20.0, [1.0; 4], 12);
        let frame = Rasterizer::new().render(&scene_with(verts), &Assets::default());
        let [r, g, b] = colors::BACKGROUND;
        assert!(frame.pixels().all(|p| p.0 == [r, g, b, 255]));
    }

    #[test]
    fn test_sprite_is_scaled_and_centered() {
        let assets = Assets {
            background: None,
            asteroid: Some(RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]))),
        };
        let mut scene = Scene::new(32, 32);
        scene.draw_list.sprite(SpriteItem {
            sprite: SpriteId::Asteroid,
            center: Vec2::new(16.0, 16.0),
            size: 10,
        });
        let frame = Rasterizer::new().render(&scene, &assets);
        assert_eq!(frame.get_pixel(11, 11).0, [0, 255, 0, 255]);
        assert_eq!(frame.get_pixel(20, 20).0, [0, 255, 0, 255]);
        assert_ne!(frame.get_pixel(21, 21).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_pip_has_border_and_content() {
        let mut scene = Scene::new(32, 32);
        scene.pip = Some(PictureInPicture {
            image: RgbImage::from_pixel(10, 8, Rgb([9, 9, 9])),
            x: 20,
            y: 22,
            border: colors::PIP_BORDER,
            border_width: 2,
        });
        let frame = Rasterizer::new().render(&scene, &Assets::default());
        assert_eq!(frame.get_pixel(20, 22).0, [255, 255, 0, 255]);
        assert_eq!(frame.get_pixel(21, 23).0, [255, 255, 0, 255]);
        assert_eq!(frame.get_pixel(25, 26).0, [9, 9, 9, 255]);
        assert_eq!(frame.get_pixel(29, 29).0, [255, 255, 0, 255]);
    }
}
