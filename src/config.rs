//! # Editor Configuration
//!
//! Every tunable constant of the editor in one place. [`EditorConfig::default`]
//! reproduces the stock editor; the `with_*` setters adjust individual parts.
//!
//! ```rust
//! use solids::config::{EditorConfig, TemplateConfig};
//!
//! let config = EditorConfig::default()
//!     .with_templates(TemplateConfig::default().with_sphere_recurse(3))
//!     .with_demo_scene(false);
//! assert_eq!(config.templates.sphere_recurse, 3);
//! ```

use crate::gfx::camera::ProjectionConfig;
use crate::gfx::geometry::{ArenaCapacity, MeshShape, PrimitiveKind};
use crate::gfx::scene::{Material, TransformBounds, LIGHT_COUNT};
use cgmath::{Point3, Vector3, Vector4};

/// Generation parameters of the four mesh templates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateConfig {
    /// Angular step of the cube, which is a coarse cylinder
    pub cube_angle: f32,
    /// Subdivision rounds of the sphere
    pub sphere_recurse: u32,
    pub cone_angle: f32,
    pub cylinder_angle: f32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            cube_angle: 90.0,
            sphere_recurse: 4,
            cone_angle: 3.0,
            cylinder_angle: 3.0,
        }
    }
}

impl TemplateConfig {
    pub fn with_sphere_recurse(mut self, recurse: u32) -> Self {
        self.sphere_recurse = recurse;
        self
    }

    pub fn with_cone_angle(mut self, angle_deg: f32) -> Self {
        self.cone_angle = angle_deg;
        self
    }

    pub fn with_cylinder_angle(mut self, angle_deg: f32) -> Self {
        self.cylinder_angle = angle_deg;
        self
    }

    /// Generator used for a primitive kind
    pub fn shape_for(&self, kind: PrimitiveKind) -> MeshShape {
        match kind {
            PrimitiveKind::Cube => MeshShape::Cylinder {
                angle_deg: self.cube_angle,
            },
            PrimitiveKind::Sphere => MeshShape::Icosphere {
                recurse: self.sphere_recurse,
            },
            PrimitiveKind::Cone => MeshShape::Cone {
                angle_deg: self.cone_angle,
            },
            PrimitiveKind::Cylinder => MeshShape::Cylinder {
                angle_deg: self.cylinder_angle,
            },
        }
    }
}

/// Default camera placement, restored by a scene reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub eye: Point3<f32>,
    pub look_at: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 600.0, 550.0),
            look_at: Point3::new(0.0, 500.0, 0.0),
            up: Vector3::unit_y(),
        }
    }
}

/// Start-up state of one light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    /// Homogeneous world-space position
    pub position: Vector4<f32>,
    /// Euler angles in degrees added to the light's rotation every animated frame
    pub orbit_step: Vector3<f32>,
}

impl LightConfig {
    pub fn white(position: Vector4<f32>, orbit_step: Vector3<f32>) -> Self {
        Self {
            ambient: Vector4::new(0.1, 0.1, 0.1, 1.0),
            diffuse: Vector4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vector4::new(1.0, 1.0, 1.0, 1.0),
            position,
            orbit_step,
        }
    }
}

pub fn default_lights() -> [LightConfig; LIGHT_COUNT] {
    [
        LightConfig::white(
            Vector4::new(0.0, 1000.0, 5000.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
        ),
        LightConfig::white(
            Vector4::new(1000.0, 8000.0, 0.0, 1.0),
            Vector3::new(0.5, 0.0, 0.1),
        ),
    ]
}

/// Values given to newly created objects
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefaults {
    pub scale: Vector3<f32>,
    /// Initial colour picker value, `#rrggbb`
    pub color_hex: String,
    pub material: Material,
}

impl Default for ObjectDefaults {
    fn default() -> Self {
        Self {
            scale: Vector3::new(50.0, 50.0, 50.0),
            color_hex: "#20d0ff".to_string(),
            material: Material::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            title: "Solids".to_string(),
        }
    }
}

/// Top-level editor configuration
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub arena: ArenaCapacity,
    pub templates: TemplateConfig,
    pub bounds: TransformBounds,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub lights: [LightConfig; LIGHT_COUNT],
    pub object_defaults: ObjectDefaults,
    pub clear_color: [f32; 4],
    pub window: WindowConfig,
    /// Populate the scene with the four demo objects at start-up
    pub demo_scene: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            arena: ArenaCapacity::default(),
            templates: TemplateConfig::default(),
            bounds: TransformBounds::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            lights: default_lights(),
            object_defaults: ObjectDefaults::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            window: WindowConfig::default(),
            demo_scene: true,
        }
    }
}

impl EditorConfig {
    pub fn with_arena(mut self, arena: ArenaCapacity) -> Self {
        self.arena = arena;
        self
    }

    pub fn with_templates(mut self, templates: TemplateConfig) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_bounds(mut self, bounds: TransformBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_lights(mut self, lights: [LightConfig; LIGHT_COUNT]) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_object_defaults(mut self, defaults: ObjectDefaults) -> Self {
        self.object_defaults = defaults;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.window.title = title.to_string();
        self
    }

    pub fn with_demo_scene(mut self, enabled: bool) -> Self {
        self.demo_scene = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates() {
        let templates = TemplateConfig::default();
        assert_eq!(
            templates.shape_for(PrimitiveKind::Cube),
            MeshShape::Cylinder { angle_deg: 90.0 }
        );
        assert_eq!(
            templates.shape_for(PrimitiveKind::Sphere),
            MeshShape::Icosphere { recurse: 4 }
        );
        assert_eq!(
            templates.shape_for(PrimitiveKind::Cone),
            MeshShape::Cone { angle_deg: 3.0 }
        );
    }

    #[test]
    fn test_builder_setters() {
        let config = EditorConfig::default()
            .with_window_size(800, 400)
            .with_title("Test")
            .with_clear_color([0.1, 0.2, 0.3, 1.0]);

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 400);
        assert_eq!(config.window.title, "Test");
        assert_eq!(config.clear_color, [0.1, 0.2, 0.3, 1.0]);
        assert!(config.demo_scene);
    }

    #[test]
    fn test_default_lights() {
        let lights = default_lights();
        assert_eq!(lights[0].position, Vector4::new(0.0, 1000.0, 5000.0, 1.0));
        assert_eq!(lights[1].orbit_step, Vector3::new(0.5, 0.0, 0.1));
        assert_eq!(lights[1].ambient, Vector4::new(0.1, 0.1, 0.1, 1.0));
    }
}
