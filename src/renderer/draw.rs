//! Draw implementations for game entities
//!
//! Each entity draws itself from its own state only.

use glam::Vec2;

use super::assets::Assets;
use super::scene::{DrawList, SpriteId, SpriteItem};
use super::shapes;
use super::vertex::colors;
use crate::cursor::Cursor;
use crate::rgba;
use crate::sim::{Asteroid, Particle};

const OUTLINE_WIDTH: f32 = 2.0;

pub trait Draw {
    fn draw(&self, list: &mut DrawList, assets: &Assets);
}

impl Draw for Asteroid {
    fn draw(&self, list: &mut DrawList, assets: &Assets) {
        if !self.alive {
            return;
        }
        let radius = self.radius as f32;
        if assets.sprite(SpriteId::Asteroid).is_some() {
            list.sprite(SpriteItem {
                sprite: SpriteId::Asteroid,
                center: self.pos,
                size: self.radius * 2,
            });
            return;
        }

        let segments = shapes::segments_for(radius);
        list.triangles(shapes::circle(
            self.pos,
            radius,
            rgba(colors::ASTEROID, 1.0),
            segments,
        ));
        list.triangles(shapes::ring(
            self.pos,
            (radius - OUTLINE_WIDTH).max(0.0),
            radius,
            rgba(colors::ASTEROID_OUTLINE, 1.0),
            segments,
        ));
    }
}

impl Draw for Particle {
    fn draw(&self, list: &mut DrawList, _assets: &Assets) {
        if !self.is_alive() {
            return;
        }
        let size = self.size as f32;
        list.triangles(shapes::circle(
            self.pos,
            size,
            rgba(self.color, self.life_fraction()),
            shapes::segments_for(size),
        ));
    }
}

impl Draw for Cursor {
    fn draw(&self, list: &mut DrawList, _assets: &Assets) {
        let radius = self.radius() as f32;
        let len = self.trail().len() as f32;

        // Older points are smaller and fainter
        for (i, point) in self.trail().enumerate() {
            let t = (i + 1) as f32 / len;
            let size = radius * 0.5 * t;
            if size < 1.0 {
                continue;
            }
            list.triangles(shapes::circle(
                point.as_vec2(),
                size,
                rgba(colors::CURSOR, t),
                shapes::segments_for(size),
            ));
        }

        if let Some(pos) = self.position() {
            let center: Vec2 = pos.as_vec2();
            list.triangles(shapes::circle(
                center,
                radius,
                rgba(colors::CURSOR, 1.0),
                shapes::segments_for(radius),
            ));
            let inner = (self.radius() / 3) as f32;
            list.triangles(shapes::circle(
                center,
                inner,
                rgba(colors::CURSOR_CENTER, 1.0),
                shapes::segments_for(inner),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ScreenPoint;
    use crate::renderer::scene::Primitive;
    use image::{Rgba, RgbaImage};

    fn draw_one(item: &impl Draw, assets: &Assets) -> DrawList {
        let mut list = DrawList::new();
        item.draw(&mut list, assets);
        list
    }

    #[test]
    fn test_asteroid_uses_sprite_when_loaded() {
        let asteroid = Asteroid::new(1, Vec2::new(50.0, 60.0), 25, 2.0);
        let shapes_only = draw_one(&asteroid, &Assets::default());
        assert_eq!(shapes_only.iter().count(), 2);

        let assets = Assets {
            background: None,
            asteroid: Some(RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255]))),
        };
        let with_sprite = draw_one(&asteroid, &assets);
        let prims: Vec<&Primitive> = with_sprite.iter().collect();
        assert_eq!(
            prims,
            vec![&Primitive::Sprite(SpriteItem {
                sprite: SpriteId::Asteroid,
                center: Vec2::new(50.0, 60.0),
                size: 50,
            })]
        );
    }

    #[test]
    fn test_dead_asteroid_draws_nothing() {
        let mut asteroid = Asteroid::new(1, Vec2::ZERO, 25, 2.0);
        asteroid.alive = false;
        assert!(draw_one(&asteroid, &Assets::default()).is_empty());
    }

    #[test]
    fn test_particle_alpha_follows_lifetime() {
        let particle = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            lifetime: 15,
            max_lifetime: 30,
            color: [255, 200, 0],
            size: 4,
        };
        let list = draw_one(&particle, &Assets::default());
        let Some(Primitive::Triangles(verts)) = list.iter().next() else {
            panic!("expected triangles");
        };
        assert!((verts[0].color[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cursor_draws_trail_then_body() {
        let mut cursor = Cursor::new(30, 10);
        cursor.update(Some(ScreenPoint::new(10, 10)));
        cursor.update(Some(ScreenPoint::new(20, 10)));
        // Two trail circles, main circle, white center
        assert_eq!(draw_one(&cursor, &Assets::default()).iter().count(), 4);

        cursor.update(None);
        assert_eq!(draw_one(&cursor, &Assets::default()).iter().count(), 2);
    }
}
