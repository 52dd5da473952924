// src/lib.rs
//! Solids
//!
//! An interactive editor for scenes of primitive solids (cubes, spheres,
//! cones, cylinders) lit by two orbiting Phong lights, built on wgpu and winit.
//!
//! All template geometry lives in one fixed-capacity arena of position, normal
//! and index buffers; scene objects are placed instances of those templates.

pub mod app;
pub mod config;
pub mod gfx;
pub mod prelude;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::EditorApp;
pub use config::EditorConfig;

/// Creates an editor with the default configuration
pub fn default() -> anyhow::Result<EditorApp> {
    EditorApp::new(EditorConfig::default())
}
