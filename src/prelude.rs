//! # Solids Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use solids::prelude::*;
//!
//! let mut scene = Scene::new(&EditorConfig::default());
//! scene.apply(EditorAction::CreateObject(PrimitiveKind::Cone)).unwrap();
//! assert_eq!(scene.objects().len(), 1);
//! ```

pub use crate::app::EditorApp;
pub use crate::config::{EditorConfig, TemplateConfig};
pub use crate::gfx::backend::{HeadlessBackend, RenderBackend};
pub use crate::gfx::camera::{Camera, ProjectionMode};
pub use crate::gfx::geometry::{MeshLibrary, PrimitiveKind};
pub use crate::gfx::rendering::{FrameStats, Renderer};
pub use crate::gfx::scene::{EditorAction, Material, Scene, SceneObject, Transform};

pub use cgmath::{Point3, Vector3, Vector4};
