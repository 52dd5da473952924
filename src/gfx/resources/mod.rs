//! GPU resource management
//!
//! Render targets owned by the wgpu backend.

pub mod texture_resource;

pub use texture_resource::TextureResource;
