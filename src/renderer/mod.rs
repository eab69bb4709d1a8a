//! Rendering output
//!
//! The simulation draws into a `Surface`; `DrawList` tessellates those calls
//! into GPU-ready vertices that a WebGPU host uploads as-is.

pub mod shapes;
pub mod vertex;

use glam::Vec2;

use crate::sim::aabb::Aabb;
pub use vertex::{Vertex, colors};

/// RGBA color
pub type Color = [f32; 4];

/// Logical-pixel drawing target provided by the host
pub trait Surface {
    fn fill_rect(&mut self, rect: Aabb, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color);

    /// Rectangle scaled about its bottom edge; positive squash widens and flattens
    fn fill_squashed_rect(&mut self, rect: Aabb, squash: f32, color: Color) {
        let w = rect.width() * (1.0 + squash);
        let h = rect.height() * (1.0 - squash);
        self.fill_rect(Aabb::from_bottom_center(rect.center().x, rect.max.y, w, h), color);
    }
}

/// Vertex list in logical pixels, rebuilt every frame
#[derive(Debug, Default)]
pub struct DrawList {
    pub vertices: Vec<Vertex>,
    /// Segments per circle (quality dependent)
    pub circle_segments: u32,
}

impl DrawList {
    pub fn new(circle_segments: u32) -> Self {
        Self {
            vertices: Vec::with_capacity(4096),
            circle_segments,
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Raw bytes for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Surface for DrawList {
    fn fill_rect(&mut self, rect: Aabb, color: Color) {
        self.vertices.extend_from_slice(&shapes::rect(&rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.vertices
            .extend(shapes::circle(center, radius, color, self.circle_segments));
    }

    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.vertices.push(Vertex::new(a.x, a.y, color));
        self.vertices.push(Vertex::new(b.x, b.y, color));
        self.vertices.push(Vertex::new(c.x, c.y, color));
    }

    fn fill_squashed_rect(&mut self, rect: Aabb, squash: f32, color: Color) {
        self.vertices
            .extend_from_slice(&shapes::squashed_rect(&rect, squash, color));
    }
}
