//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
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

    /// Buffer layout for the host's WebGPU pipeline
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements that don't follow the zone palette
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.95, 0.75, 0.2, 1.0];
    pub const PLAYER_HURT: [f32; 4] = [1.0, 1.0, 1.0, 0.5];
    pub const SHIELD: [f32; 4] = [0.4, 0.8, 1.0, 0.35];
    pub const STAR: [f32; 4] = [1.0, 0.95, 0.4, 0.45];
    pub const GRAIN: [f32; 4] = [1.0, 0.85, 0.3, 1.0];
    pub const SPIKE: [f32; 4] = [0.75, 0.75, 0.8, 1.0];
    pub const CRAWLER: [f32; 4] = [0.55, 0.3, 0.7, 1.0];
    pub const FLYER: [f32; 4] = [0.8, 0.35, 0.25, 1.0];
    pub const ARMOR: [f32; 4] = [0.6, 0.6, 0.65, 1.0];
    pub const SPRING: [f32; 4] = [0.3, 0.9, 0.4, 1.0];
    pub const GATE: [f32; 4] = [0.6, 0.4, 1.0, 0.9];
    pub const CHECKPOINT_IDLE: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
    pub const CHECKPOINT_LIT: [f32; 4] = [0.2, 1.0, 0.5, 1.0];
    pub const PIT: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
    pub const FLASH: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
