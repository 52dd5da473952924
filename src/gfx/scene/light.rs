use cgmath::{Matrix4, Point3, Vector3, Vector4};

use super::object::Transform;
use crate::config::LightConfig;

/// A point light orbiting on its own Euler rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    /// Homogeneous world-space position before rotation
    pub position: Vector4<f32>,
    /// Current orbit angles in degrees about X, Y, Z
    pub rotate: Vector3<f32>,
    /// Degrees added to `rotate` per animated frame
    pub orbit_step: Vector3<f32>,
}

impl Light {
    pub fn new(config: &LightConfig) -> Self {
        Self {
            ambient: config.ambient,
            diffuse: config.diffuse,
            specular: config.specular,
            position: config.position,
            rotate: Vector3::new(0.0, 0.0, 0.0),
            orbit_step: config.orbit_step,
        }
    }

    /// Rotates by the orbit angles, then moves into the frame of a camera at `eye`
    pub fn transform(&self, eye: Point3<f32>) -> Matrix4<f32> {
        let to_eye = Matrix4::from_translation(Vector3::new(-eye.x, -eye.y, -eye.z));
        to_eye * Transform::rotation_matrix(self.rotate)
    }

    /// Light position relative to a camera at `eye`
    pub fn eye_space_position(&self, eye: Point3<f32>) -> Vector4<f32> {
        self.transform(eye) * self.position
    }

    /// Advances the orbit by one frame
    pub fn advance(&mut self) {
        self.rotate += self.orbit_step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_lights;
    use cgmath::InnerSpace;

    #[test]
    fn test_unrotated_light_is_offset_by_eye() {
        let light = Light::new(&default_lights()[0]);
        let eye = Point3::new(0.0, 600.0, 550.0);

        let p = light.eye_space_position(eye);
        assert_eq!(p, Vector4::new(0.0, 400.0, 4450.0, 1.0));
    }

    #[test]
    fn test_orbit_rotates_about_origin() {
        let mut light = Light::new(&default_lights()[1]);
        light.rotate = Vector3::new(0.0, 90.0, 0.0);

        let p = light.eye_space_position(Point3::new(0.0, 0.0, 0.0));
        // +X rotated 90 degrees about Y points to -Z
        assert!((p.truncate() - Vector3::new(0.0, 8000.0, -1000.0)).magnitude() < 1e-2);
    }

    #[test]
    fn test_advance_steps() {
        let [first, second] = default_lights();
        let mut light0 = Light::new(&first);
        let mut light1 = Light::new(&second);

        light0.advance();
        light1.advance();
        light1.advance();

        assert_eq!(light0.rotate, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(light1.rotate, Vector3::new(1.0, 0.0, 0.2));
    }
}
