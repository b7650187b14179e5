//! Rendering module
//!
//! Entities emit triangles, sprites and text into a layered [`DrawList`];
//! the software rasterizer turns a [`Scene`] into pixels.

pub mod assets;
pub mod draw;
pub mod raster;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use assets::Assets;
pub use draw::Draw;
pub use raster::Rasterizer;
pub use scene::{Anchor, DrawList, Layer, PictureInPicture, Primitive, Scene, TextItem};
pub use vertex::Vertex;
