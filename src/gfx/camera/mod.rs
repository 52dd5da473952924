//! Viewer camera and projection
//!
//! The camera is a plain eye / look-at pair, moved only through scene
//! actions. Projection matrices are
//! produced in OpenGL clip conventions and corrected for wgpu by the backend
//! with [`OPENGL_TO_WGPU_MATRIX`].

use crate::config::CameraConfig;
use cgmath::{ortho, perspective, Deg, Matrix4, Point3, Vector3};

/// Maps OpenGL clip-space depth (`[-1, 1]`) to wgpu depth (`[0, 1]`)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Fixed orthographic viewing box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoBox {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

/// Parameters of both projection modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    pub fovy_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub ortho: OrthoBox,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fovy_deg: 90.0,
            aspect: 2.0,
            near: 1.0,
            far: 10000.0,
            ortho: OrthoBox {
                left: -2000.0,
                right: 2000.0,
                bottom: -1000.0,
                top: 1000.0,
                near: -2000.0,
                far: 2000.0,
            },
        }
    }
}

impl ProjectionConfig {
    /// Projection matrix for `mode`, in OpenGL clip conventions
    pub fn matrix(&self, mode: ProjectionMode) -> Matrix4<f32> {
        match mode {
            ProjectionMode::Perspective => {
                perspective(Deg(self.fovy_deg), self.aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let b = &self.ortho;
                ortho(b.left, b.right, b.bottom, b.top, b.near, b.far)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub look_at: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new(eye: Point3<f32>, look_at: Point3<f32>) -> Self {
        Self {
            eye,
            look_at,
            up: Vector3::unit_y(),
        }
    }

    /// World-to-eye transform
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.look_at, self.up)
    }
}

impl From<&CameraConfig> for Camera {
    fn from(config: &CameraConfig) -> Self {
        Self {
            eye: config.eye,
            look_at: config.look_at,
            up: config.up,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}
