//! Per-frame scene composition
//!
//! [`Renderer::render_frame`] turns the current [`Scene`] into backend
//! commands: clear, projection, light orbit, then for every object in
//! insertion order its lighting products, model-view matrix and template draw.

use cgmath::{ElementWise, Matrix4, Vector4};
use log::{debug, trace};
use thiserror::Error;

use crate::gfx::backend::{BackendError, RenderBackend, UniformSlot};
use crate::gfx::camera::ProjectionConfig;
use crate::gfx::geometry::MeshLibrary;
use crate::gfx::scene::{Scene, SceneObject, LIGHT_COUNT};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),
}

/// Per-object lighting inputs, one entry per light
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniforms {
    pub ambient_product: [[f32; 4]; LIGHT_COUNT],
    pub diffuse_product: [[f32; 4]; LIGHT_COUNT],
    pub specular_product: [[f32; 4]; LIGHT_COUNT],
    /// Light positions in eye space
    pub light_position: [[f32; 4]; LIGHT_COUNT],
}

impl Default for LightingUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl LightingUniforms {
    /// Writes the light-times-material products for `object` in place
    fn fill(&mut self, scene: &Scene, object: &SceneObject, eye_positions: &[Vector4<f32>; LIGHT_COUNT]) {
        let material = &object.material;
        for (i, light) in scene.lights().iter().enumerate() {
            self.ambient_product[i] = light.ambient.mul_element_wise(material.ambient).into();
            self.diffuse_product[i] = light.diffuse.mul_element_wise(material.diffuse).into();
            self.specular_product[i] = light.specular.mul_element_wise(material.specular).into();
            self.light_position[i] = eye_positions[i].into();
        }
    }
}

/// Counters of the last composed frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames composed so far, including this one
    pub frame: u64,
    pub draw_calls: u32,
    pub triangles: u32,
}

/// Composes frames from a scene and the mesh library
pub struct Renderer {
    projection: ProjectionConfig,
    clear_color: [f32; 4],
    lighting: LightingUniforms,
    frames: u64,
    last_stats: FrameStats,
}

impl Renderer {
    pub fn new(projection: ProjectionConfig, clear_color: [f32; 4]) -> Self {
        Self {
            projection,
            clear_color,
            lighting: LightingUniforms::default(),
            frames: 0,
            last_stats: FrameStats::default(),
        }
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Lighting inputs of the last drawn object
    pub fn lighting(&self) -> &LightingUniforms {
        &self.lighting
    }

    /// Composes one complete frame
    ///
    /// Lights orbit only while the scene is animating; in that case the next
    /// frame is requested once this one has been issued.
    pub fn render_frame<B: RenderBackend + ?Sized>(
        &mut self,
        scene: &mut Scene,
        library: &MeshLibrary,
        backend: &mut B,
    ) -> Result<FrameStats, RenderError> {
        backend.bind_program(library.bindings())?;
        backend.clear(self.clear_color)?;

        let projection: Matrix4<f32> = self.projection.matrix(scene.projection());
        backend.set_matrix(UniformSlot::Projection, &projection)?;

        if scene.is_animating() {
            scene.advance_lights();
        }

        let eye = scene.camera().eye;
        let eye_positions = scene.lights().map(|light| light.eye_space_position(eye));
        let view = scene.camera().view_matrix();

        let mut stats = FrameStats {
            frame: self.frames + 1,
            ..Default::default()
        };

        for object in scene.objects() {
            self.lighting.fill(scene, object, &eye_positions);

            backend.set_vectors(UniformSlot::AmbientProduct, &self.lighting.ambient_product)?;
            backend.set_vectors(UniformSlot::DiffuseProduct, &self.lighting.diffuse_product)?;
            backend.set_vectors(UniformSlot::SpecularProduct, &self.lighting.specular_product)?;
            backend.set_vectors(UniformSlot::LightPosition, &self.lighting.light_position)?;
            backend.set_float(UniformSlot::Shininess, object.material.shininess)?;

            let model_view = view * object.model_matrix();
            backend.set_matrix(UniformSlot::ModelView, &model_view)?;

            let template = library.get(object.kind());
            template.draw(backend)?;

            stats.draw_calls += 1;
            stats.triangles += template.handle().triangle_count;
            trace!("Drew '{}' ({})", object.name(), object.kind());
        }

        self.frames += 1;
        self.last_stats = stats;

        if scene.is_animating() {
            backend.request_frame();
        }

        if self.frames % 600 == 0 {
            debug!(
                "Frame {}: {} draws, {} triangles",
                stats.frame, stats.draw_calls, stats.triangles
            );
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::gfx::backend::{BackendCommand, HeadlessBackend};
    use crate::gfx::geometry::PrimitiveKind;
    use crate::gfx::scene::{EditorAction, Light};
    use cgmath::{Vector3, Zero};

    struct Fixture {
        backend: HeadlessBackend,
        library: MeshLibrary,
        scene: Scene,
        renderer: Renderer,
    }

    fn fixture() -> Fixture {
        let config = EditorConfig::default();
        let mut backend = HeadlessBackend::new();
        let library = MeshLibrary::build(&mut backend, config.arena, &config.templates).unwrap();
        backend.take_commands();

        Fixture {
            backend,
            library,
            scene: Scene::new(&config),
            renderer: Renderer::new(config.projection, config.clear_color),
        }
    }

    impl Fixture {
        fn frame(&mut self) -> FrameStats {
            self.renderer
                .render_frame(&mut self.scene, &self.library, &mut self.backend)
                .unwrap()
        }
    }

    #[test]
    fn test_lights_orbit_one_step_per_animated_frame() {
        let mut f = fixture();
        f.scene.set_animating(true);
        let before: Vec<Vector3<f32>> = f.scene.lights().iter().map(|l| l.rotate).collect();

        f.frame();

        let after = f.scene.lights();
        assert_eq!(after[0].rotate, before[0] + Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(after[1].rotate, before[1] + Vector3::new(0.5, 0.0, 0.1));
        assert_eq!(f.backend.frame_requests(), 1);
    }

    #[test]
    fn test_paused_frames_do_not_orbit_or_reschedule() {
        let mut f = fixture();
        f.frame();
        f.frame();

        assert!(f.scene.lights().iter().all(|l| l.rotate.is_zero()));
        assert_eq!(f.backend.frame_requests(), 0);
        assert_eq!(f.renderer.last_stats().frame, 2);
    }

    #[test]
    fn test_command_sequence_for_one_object() {
        let mut f = fixture();
        f.scene
            .apply(EditorAction::CreateObject(PrimitiveKind::Sphere))
            .unwrap();
        f.frame();

        let commands = f.backend.take_commands();
        assert_eq!(commands.len(), 10);
        assert!(matches!(commands[0], BackendCommand::BindProgram(_)));
        assert_eq!(commands[1], BackendCommand::Clear([0.0, 0.0, 0.0, 1.0]));
        assert!(matches!(
            commands[2],
            BackendCommand::SetMatrix(UniformSlot::Projection, _)
        ));
        assert!(matches!(
            commands[3],
            BackendCommand::SetVectors(UniformSlot::AmbientProduct, _)
        ));
        assert!(matches!(
            commands[6],
            BackendCommand::SetVectors(UniformSlot::LightPosition, _)
        ));
        assert_eq!(commands[7], BackendCommand::SetFloat(UniformSlot::Shininess, 15.0));
        assert!(matches!(
            commands[8],
            BackendCommand::SetMatrix(UniformSlot::ModelView, _)
        ));

        let sphere = f.library.get(PrimitiveKind::Sphere).handle();
        assert_eq!(
            commands[9],
            BackendCommand::DrawIndexed {
                count: sphere.index_count,
                byte_offset: sphere.index_offset as u64 * 2,
            }
        );
    }

    #[test]
    fn test_lighting_products() {
        let mut f = fixture();
        f.scene.create_object(PrimitiveKind::Cone).unwrap();
        f.scene.set_color("#ff8000").unwrap();
        f.scene.set_animating(true);
        f.frame();

        let lighting = *f.renderer.lighting();
        for i in 0..LIGHT_COUNT {
            assert_eq!(lighting.ambient_product[i], [0.025, 0.025, 0.025, 1.0]);
            assert_eq!(lighting.diffuse_product[i], [1.0, 128.0 / 255.0, 0.0, 1.0]);
            assert_eq!(lighting.specular_product[i], [0.5, 0.5, 0.5, 1.0]);
        }

        // positions reflect the orbit after this frame's step
        let eye = f.scene.camera().eye;
        let lights: &[Light; LIGHT_COUNT] = f.scene.lights();
        for (i, light) in lights.iter().enumerate() {
            let expected: [f32; 4] = light.eye_space_position(eye).into();
            assert_eq!(lighting.light_position[i], expected);
        }
    }

    #[test]
    fn test_objects_drawn_in_insertion_order() {
        let mut f = fixture();
        f.scene.populate_demo().unwrap();
        f.scene.set_animating(false);
        let stats = f.frame();

        let draws: Vec<BackendCommand> = f
            .backend
            .take_commands()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    BackendCommand::DrawIndexed { .. } | BackendCommand::DrawArrays { .. }
                )
            })
            .collect();

        let cube = f.library.get(PrimitiveKind::Cube).handle();
        let cylinder = f.library.get(PrimitiveKind::Cylinder).handle();
        assert_eq!(draws.len(), 4);
        assert_eq!(
            draws[0],
            BackendCommand::DrawArrays {
                first: cube.vertex_offset,
                count: cube.triangle_count * 3,
            }
        );
        assert!(matches!(draws[1], BackendCommand::DrawIndexed { .. }));
        assert_eq!(
            draws[3],
            BackendCommand::DrawArrays {
                first: cylinder.vertex_offset,
                count: cylinder.triangle_count * 3,
            }
        );
        assert_eq!(stats.draw_calls, 4);
        assert_eq!(stats.triangles, 16 + 5120 + 240 + 480);
    }

    #[test]
    fn test_model_view_upload() {
        let mut f = fixture();
        f.scene.create_object(PrimitiveKind::Cube).unwrap();
        f.frame();

        let object = &f.scene.objects()[0];
        let expected: [[f32; 4]; 4] =
            (f.scene.camera().view_matrix() * object.model_matrix()).into();
        let uploaded = f.backend.commands().iter().find_map(|c| match c {
            BackendCommand::SetMatrix(UniformSlot::ModelView, m) => Some(*m),
            _ => None,
        });
        assert_eq!(uploaded, Some(expected));
    }
}
