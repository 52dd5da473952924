use cgmath::{Deg, Matrix4, Vector3, Vector4};

use crate::gfx::camera::Camera;
use crate::gfx::geometry::PrimitiveKind;

/// Phong material terms of an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector4::new(0.25, 0.25, 0.25, 1.0),
            diffuse: Vector4::new(0.0, 0.5, 1.0, 1.0),
            specular: Vector4::new(0.5, 0.5, 0.5, 1.0),
            shininess: 15.0,
        }
    }
}

/// Scale, Euler rotation (degrees about X, Y, Z) and translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vector3<f32>,
    pub rotate: Vector3<f32>,
    pub translate: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotate: Vector3::new(0.0, 0.0, 0.0),
            translate: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Transform {
    pub fn new(scale: Vector3<f32>, rotate: Vector3<f32>, translate: Vector3<f32>) -> Self {
        Self {
            scale,
            rotate,
            translate,
        }
    }

    /// Combined Euler rotation `Rz * Ry * Rx`
    pub fn rotation_matrix(rotate: Vector3<f32>) -> Matrix4<f32> {
        Matrix4::from_angle_z(Deg(rotate.z))
            * Matrix4::from_angle_y(Deg(rotate.y))
            * Matrix4::from_angle_x(Deg(rotate.x))
    }

    /// Local-to-world matrix: scale, then rotate X, Y, Z, then translate
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.translate);
        let r = Self::rotation_matrix(self.rotate);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s
    }
}

/// Per-axis limits applied to rotation and translation; scale is unbounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformBounds {
    pub rotate_min: Vector3<f32>,
    pub rotate_max: Vector3<f32>,
    pub translate_min: Vector3<f32>,
    pub translate_max: Vector3<f32>,
}

impl Default for TransformBounds {
    fn default() -> Self {
        Self::symmetric(180.0, 1000.0)
    }
}

fn clamp_vector(v: Vector3<f32>, min: Vector3<f32>, max: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        v.x.clamp(min.x, max.x),
        v.y.clamp(min.y, max.y),
        v.z.clamp(min.z, max.z),
    )
}

impl TransformBounds {
    /// Bounds of `±rotate_limit` degrees and `±translate_limit` units on every axis
    pub fn symmetric(rotate_limit: f32, translate_limit: f32) -> Self {
        let r = Vector3::new(rotate_limit, rotate_limit, rotate_limit);
        let t = Vector3::new(translate_limit, translate_limit, translate_limit);
        Self {
            rotate_min: -r,
            rotate_max: r,
            translate_min: -t,
            translate_max: t,
        }
    }

    pub fn clamp_rotate(&self, rotate: Vector3<f32>) -> Vector3<f32> {
        clamp_vector(rotate, self.rotate_min, self.rotate_max)
    }

    pub fn clamp_translate(&self, translate: Vector3<f32>) -> Vector3<f32> {
        clamp_vector(translate, self.translate_min, self.translate_max)
    }

    pub fn clamp(&self, transform: Transform) -> Transform {
        Transform {
            scale: transform.scale,
            rotate: self.clamp_rotate(transform.rotate),
            translate: self.clamp_translate(transform.translate),
        }
    }
}

/// A placed instance of a mesh template
///
/// The object refers to its geometry only through its [`PrimitiveKind`]; the
/// mesh itself lives once in the [`MeshLibrary`](crate::gfx::geometry::MeshLibrary).
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: String,
    kind: PrimitiveKind,
    /// Display colour; mirrors the diffuse term
    color: [f32; 4],
    pub material: Material,
    transform: Transform,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: PrimitiveKind, material: Material) -> Self {
        Self {
            name: name.into(),
            kind,
            color: material.diffuse.into(),
            material,
            transform: Transform::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Sets the display colour and the diffuse term together
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
        self.material.diffuse = color.into();
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Stores `transform` with rotation and translation clamped to `bounds`
    pub fn set_transform(&mut self, transform: Transform, bounds: &TransformBounds) {
        self.transform = bounds.clamp(transform);
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.transform.model_matrix()
    }

    /// `view * model` for the given camera
    pub fn model_view_matrix(&self, camera: &Camera) -> Matrix4<f32> {
        camera.view_matrix() * self.model_matrix()
    }
}
