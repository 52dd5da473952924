//! # Graphics Module
//!
//! Everything between the editor's scene and the pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Backend** ([`backend`]) - the [`RenderBackend`](backend::RenderBackend)
//!   capability and an in-memory recording implementation
//! - **Geometry** ([`geometry`]) - primitive generators, the fixed-capacity
//!   geometry arena and the mesh template library
//! - **Camera** ([`camera`]) - look-at camera and perspective / orthographic projection
//! - **Scene** ([`scene`]) - objects, lights, selection and editor actions
//! - **Rendering** ([`rendering`]) - per-frame composition and the wgpu backend
//! - **Resources** ([`resources`]) - render targets
//!
//! ## Usage
//!
//! ```rust
//! use solids::config::EditorConfig;
//! use solids::gfx::{backend::HeadlessBackend, geometry::MeshLibrary, rendering::Renderer, scene::Scene};
//!
//! let config = EditorConfig::default();
//! let mut backend = HeadlessBackend::new();
//! let library = MeshLibrary::build(&mut backend, config.arena, &config.templates).unwrap();
//! let mut scene = Scene::new(&config);
//! scene.populate_demo().unwrap();
//!
//! let mut renderer = Renderer::new(config.projection, config.clear_color);
//! let stats = renderer.render_frame(&mut scene, &library, &mut backend).unwrap();
//! assert_eq!(stats.draw_calls, 4);
//! ```

pub mod backend;
pub mod camera;
pub mod color;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;
