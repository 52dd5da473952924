//! Vertex input layout of the shading pipeline
//!
//! Positions and normals come from two separate arena buffers, so the
//! pipeline reads two vertex streams of tightly packed `[f32; 3]`:
//!
//! - slot 0, location 0: position
//! - slot 1, location 1: normal

use crate::gfx::geometry::arena::VERTEX_STRIDE;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Vertex buffer slot of the position stream
pub const POSITION_SLOT: u32 = 0;
/// Vertex buffer slot of the normal stream
pub const NORMAL_SLOT: u32 = 1;

pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }
}

pub fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &NORMAL_ATTRIBUTES,
    }
}
