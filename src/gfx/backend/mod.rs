//! # Rendering Backend Capability
//!
//! The editor core never talks to a graphics API directly. Everything it needs
//! from the GPU side (buffer storage, uniform upload, draw submission, frame
//! scheduling) goes through the [`RenderBackend`] trait defined here.
//!
//! Two implementations ship with the crate:
//!
//! - [`RenderEngine`](crate::gfx::rendering::RenderEngine) - the wgpu backend used by the editor window
//! - [`HeadlessBackend`] - an in-memory backend that records every command,
//!   used by the test-suite and for running the pipeline without a GPU
//!
//! ## Frame Model
//!
//! The interface follows the classic immediate-mode shape: uniform slots are
//! set individually and keep their value until overwritten, and every draw
//! call consumes the uniform state current at the moment it is issued.

pub mod headless;

pub use headless::{BackendCommand, HeadlessBackend};

use cgmath::Matrix4;
use thiserror::Error;

/// Opaque handle to a buffer allocated through a [`RenderBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

impl BufferId {
    /// Position of the buffer in the backend's allocation order
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a buffer is bound as when drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex attribute data (positions, normals)
    Vertex,
    /// 16-bit triangle indices
    Index,
}

/// Named uniform slots exposed by the shading program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    Projection,
    ModelView,
    AmbientProduct,
    DiffuseProduct,
    SpecularProduct,
    LightPosition,
    Shininess,
}

impl UniformSlot {
    /// Name of the slot as declared in the shader
    pub fn name(&self) -> &'static str {
        match self {
            UniformSlot::Projection => "projection",
            UniformSlot::ModelView => "model_view",
            UniformSlot::AmbientProduct => "ambient_product",
            UniformSlot::DiffuseProduct => "diffuse_product",
            UniformSlot::SpecularProduct => "specular_product",
            UniformSlot::LightPosition => "light_position",
            UniformSlot::Shininess => "shininess",
        }
    }
}

/// Attribute and index sources bound to the shading program
///
/// `positions` and `normals` feed the two vertex attributes (3 x f32 each),
/// `indices` is the element buffer used by indexed draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramBindings {
    pub positions: BufferId,
    pub normals: BufferId,
    pub indices: BufferId,
}

/// Failures reported by a rendering backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),

    #[error("write of {len} bytes at offset {offset} exceeds buffer {buffer:?} of {size} bytes")]
    WriteOutOfRange {
        buffer: BufferId,
        offset: u64,
        len: usize,
        size: u64,
    },

    #[error("uniform slot '{slot}' expects {expected} values, got {actual}")]
    UniformSize {
        slot: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("uniform slot '{0}' does not accept this value type")]
    UniformType(&'static str),

    #[error("draw issued before a program was bound")]
    NoProgram,

    #[error("surface error: {0}")]
    Surface(String),

    #[error("graphics initialisation failed: {0}")]
    Init(String),

    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
}

/// Capability interface over the graphics API
///
/// Mirrors what the editor core requires from its rendering collaborator:
/// fixed-size buffer allocation, sub-range writes, program binding, uniform
/// upload, indexed and non-indexed triangle draws, target clearing and
/// next-frame scheduling.
pub trait RenderBackend {
    /// Allocates a buffer of `size` bytes
    fn create_buffer(&mut self, kind: BufferKind, size: u64, label: &str)
        -> Result<BufferId, BackendError>;

    /// Writes `data` into `buffer` starting at byte `offset`
    fn write_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8])
        -> Result<(), BackendError>;

    /// Binds the shading program to its attribute and index sources
    fn bind_program(&mut self, bindings: ProgramBindings) -> Result<(), BackendError>;

    /// Sets a 4x4 matrix uniform (column-major, as produced by cgmath)
    fn set_matrix(&mut self, slot: UniformSlot, matrix: &Matrix4<f32>)
        -> Result<(), BackendError>;

    /// Sets a vec4-array uniform
    fn set_vectors(&mut self, slot: UniformSlot, values: &[[f32; 4]])
        -> Result<(), BackendError>;

    /// Sets a scalar float uniform
    fn set_float(&mut self, slot: UniformSlot, value: f32) -> Result<(), BackendError>;

    /// Draws `count` indices as triangles, starting `byte_offset` bytes into
    /// the bound 16-bit index buffer
    fn draw_indexed(&mut self, count: u32, byte_offset: u64) -> Result<(), BackendError>;

    /// Draws `count` vertices as triangles, starting at vertex `first`
    fn draw_arrays(&mut self, first: u32, count: u32) -> Result<(), BackendError>;

    /// Clears the color and depth targets, starting a new frame
    fn clear(&mut self, color: [f32; 4]) -> Result<(), BackendError>;

    /// Asks the environment to run the render step again on the next refresh
    fn request_frame(&mut self);
}
