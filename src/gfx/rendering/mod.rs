//! Core rendering functionality
//!
//! Frame composition on top of [`RenderBackend`](crate::gfx::backend::RenderBackend),
//! plus the wgpu backend with its pipeline and vertex layout.

pub mod frame;
pub mod pipeline_manager;
pub mod render_engine;
pub mod vertex;

// Re-export main types
pub use frame::{FrameStats, LightingUniforms, RenderError, Renderer};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{DrawUniforms, RenderEngine};
