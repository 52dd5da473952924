//! # User Interface Module
//!
//! Dear ImGui control surface of the editor.
//!
//! - [`UiManager`] - imgui context with winit input and wgpu rendering
//! - [`panel`] - the "Scene Editor" window, which turns widget interaction
//!   into [`EditorAction`](crate::gfx::scene::EditorAction)s
//!
//! The panel never mutates the scene; the app applies the returned actions
//! before composing the frame.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{editor_panel, PanelState};
