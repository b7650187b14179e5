//! Draw lists and the per-tick scene handed to a display

use glam::Vec2;
use image::RgbImage;

use super::vertex::Vertex;

/// Paint order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background = 0,
    Asteroids = 1,
    Particles = 2,
    Cursor = 3,
    Ui = 4,
}

const LAYER_COUNT: usize = 5;

/// Image assets that can be placed as sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Asteroid,
}

/// A sprite scaled to `size` x `size` pixels, centered on a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteItem {
    pub sprite: SpriteId,
    pub center: Vec2,
    pub size: u32,
}

/// How a text item is positioned relative to its point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    Center,
}

/// A line of text; glyph rendering is up to the display
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub pos: Vec2,
    /// Font size in pixels
    pub size: u32,
    pub color: [u8; 3],
    pub anchor: Anchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Triangles(Vec<Vertex>),
    Sprite(SpriteItem),
    Text(TextItem),
}

/// Primitives grouped by layer, in submission order within each layer
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    layers: [Vec<Primitive>; LAYER_COUNT],
    current: usize,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route subsequent pushes to `layer`
    pub fn set_layer(&mut self, layer: Layer) {
        self.current = layer as usize;
    }

    pub fn triangles(&mut self, vertices: Vec<Vertex>) {
        if !vertices.is_empty() {
            self.layers[self.current].push(Primitive::Triangles(vertices));
        }
    }

    pub fn sprite(&mut self, item: SpriteItem) {
        self.layers[self.current].push(Primitive::Sprite(item));
    }

    pub fn text(&mut self, item: TextItem) {
        self.layers[self.current].push(Primitive::Text(item));
    }

    /// All primitives, back to front
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.layers.iter().flatten()
    }

    pub fn layer(&self, layer: Layer) -> &[Primitive] {
        &self.layers[layer as usize]
    }

    /// Text items, back to front
    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }
}

/// Camera debug view shown in a screen corner
#[derive(Debug, Clone)]
pub struct PictureInPicture {
    pub image: RgbImage,
    /// Top-left corner on screen
    pub x: u32,
    pub y: u32,
    pub border: [u8; 3],
    pub border_width: u32,
}

/// Everything a display needs for one frame
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub draw_list: DrawList,
    /// Drawn over every layer
    pub pip: Option<PictureInPicture>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            draw_list: DrawList::new(),
            pip: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> TextItem {
        TextItem {
            text: text.to_string(),
            pos: Vec2::ZERO,
            size: 12,
            color: [255; 3],
            anchor: Anchor::TopLeft,
        }
    }

    #[test]
    fn test_layers_iterate_back_to_front() {
        let mut list = DrawList::new();
        list.set_layer(Layer::Ui);
        list.text(label("ui"));
        list.set_layer(Layer::Background);
        list.text(label("bg"));
        list.set_layer(Layer::Cursor);
        list.text(label("cursor"));

        let order: Vec<&str> = list.texts().map(|t| t.text.as_str()).collect();
        assert_eq!(order, vec!["bg", "cursor", "ui"]);
    }

    #[test]
    fn test_empty_triangles_are_dropped() {
        let mut list = DrawList::new();
        list.triangles(Vec::new());
        assert!(list.is_empty());
    }
}
