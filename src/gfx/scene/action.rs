use cgmath::{Point3, Vector3};

use crate::gfx::camera::ProjectionMode;
use crate::gfx::geometry::PrimitiveKind;

/// A discrete edit requested by the control surface
///
/// Actions are queued by the UI and applied to the
/// [`Scene`](super::Scene) between frames, one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    CreateObject(PrimitiveKind),
    DeleteObject(String),
    SelectObject(String),
    /// Replace the selected object's transform
    SetTransform {
        scale: Vector3<f32>,
        rotate: Vector3<f32>,
        translate: Vector3<f32>,
    },
    /// Recolour the selected object from a `#rrggbb` string
    SetColor(String),
    SetCamera {
        eye: Point3<f32>,
        look_at: Point3<f32>,
    },
    SetProjection(ProjectionMode),
    SetAnimating(bool),
    /// Pointer drag in screen pixels, `dy` already pointing up
    DragSelected { dx: f32, dy: f32 },
    Reset,
}
