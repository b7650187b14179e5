//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in screen pixels with a straight-alpha color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for game elements (8-bit RGB)
pub mod colors {
    pub const BACKGROUND: [u8; 3] = [10, 10, 30];
    pub const ASTEROID: [u8; 3] = [200, 50, 50];
    pub const ASTEROID_OUTLINE: [u8; 3] = [100, 25, 25];
    pub const CURSOR: [u8; 3] = [0, 255, 100];
    pub const CURSOR_CENTER: [u8; 3] = [255, 255, 255];
    pub const TEXT: [u8; 3] = [255, 255, 255];
    pub const TITLE: [u8; 3] = [100, 200, 255];
    pub const GAME_OVER: [u8; 3] = [255, 100, 100];
    pub const HINT: [u8; 3] = [150, 150, 150];
    pub const OVERLAY: [u8; 3] = [0, 0, 0];
    pub const PIP_BORDER: [u8; 3] = [255, 255, 0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let verts = [Vertex::new(1.0, 2.0, [0.5; 4])];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 24);
    }
}
