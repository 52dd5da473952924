//! # Scene Management Module
//!
//! The editable state of the editor, gathered in one [`Scene`] aggregate that
//! is handed to the renderer each frame and to every action handler between
//! frames.
//!
//! ## Key Components
//!
//! - [`Scene`] - objects in draw order, the two lights, camera, projection mode
//!   and the current selection
//! - [`SceneObject`] - a placed instance of a mesh template with its own
//!   [`Transform`] and [`Material`]
//! - [`Light`] - a point light with Phong colour terms and a per-frame orbit
//! - [`EditorAction`] - the discrete edits the control surface can request
//!
//! ## Usage
//!
//! ```rust
//! use solids::config::EditorConfig;
//! use solids::gfx::geometry::PrimitiveKind;
//! use solids::gfx::scene::{EditorAction, Scene};
//!
//! let mut scene = Scene::new(&EditorConfig::default());
//! scene.apply(EditorAction::CreateObject(PrimitiveKind::Sphere)).unwrap();
//! assert_eq!(scene.selected_name(), Some("sphere1"));
//! ```

pub mod action;
pub mod light;
pub mod object;
pub mod scene;

/// Number of lights in every scene
pub const LIGHT_COUNT: usize = 2;

// Re-export main types
pub use action::EditorAction;
pub use light::Light;
pub use object::{Material, SceneObject, Transform, TransformBounds};
pub use scene::{Scene, SceneError, SceneStatistics};
