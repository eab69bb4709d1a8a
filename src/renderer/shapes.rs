//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::sim::aabb::Aabb;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Two triangles covering a rectangle
pub fn rect(rect: &Aabb, color: [f32; 4]) -> [Vertex; 6] {
    let (a, b) = (rect.min, rect.max);
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, a.y, color),
        Vertex::new(a.x, b.y, color),
        Vertex::new(a.x, b.y, color),
        Vertex::new(b.x, a.y, color),
        Vertex::new(b.x, b.y, color),
    ]
}

/// Rectangle scaled about its bottom-center (squash and stretch)
pub fn squashed_rect(rect: &Aabb, squash: f32, color: [f32; 4]) -> [Vertex; 6] {
    let w = rect.width() * (1.0 + squash);
    let h = rect.height() * (1.0 - squash);
    let cx = rect.center().x;
    self::rect(&Aabb::from_bottom_center(cx, rect.max.y, w, h), color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 12).len(), 36);
        // Degenerate segment counts are bumped to a triangle
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 1).len(), 9);
    }

    #[test]
    fn test_squash_keeps_feet_planted() {
        let body = Aabb::new(10.0, 20.0, 30.0, 40.0);
        let verts = squashed_rect(&body, 0.25, [1.0; 4]);
        let max_y = verts.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let min_y = verts.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 60.0);
        assert!((max_y - min_y - 30.0).abs() < 1e-4);
    }
}
