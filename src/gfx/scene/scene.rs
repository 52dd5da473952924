use cgmath::{Point3, Vector3, Vector4};
use log::{debug, info, warn};
use thiserror::Error;

use super::action::EditorAction;
use super::light::Light;
use super::object::{Material, SceneObject, Transform, TransformBounds};
use super::LIGHT_COUNT;
use crate::config::{CameraConfig, EditorConfig, ObjectDefaults};
use crate::gfx::camera::{Camera, ProjectionMode};
use crate::gfx::color::{parse_hex_color, to_hex_color, ColorParseError};
use crate::gfx::geometry::template::UnknownPrimitive;
use crate::gfx::geometry::{MeshLibrary, PrimitiveKind};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("no object named '{0}'")]
    UnknownObject(String),

    #[error("no object is selected")]
    NoSelection,

    #[error(transparent)]
    UnknownPrimitive(#[from] UnknownPrimitive),

    #[error(transparent)]
    Color(#[from] ColorParseError),
}

/// Everything the editor edits: objects, lights, camera and view state
///
/// Objects are drawn in insertion order. The selection is tracked by name
/// and always refers to a live object or to nothing.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: [Light; LIGHT_COUNT],
    camera: Camera,
    projection: ProjectionMode,
    selected: Option<String>,
    animating: bool,
    /// Suffix of the next created object's name, minus one
    object_counter: u32,
    /// `#rrggbb` shown by the colour picker; new objects take this colour
    picker_color: String,
    bounds: TransformBounds,
    default_camera: CameraConfig,
    object_defaults: ObjectDefaults,
}

impl Scene {
    /// Creates an empty scene with the configured lights and default camera
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            objects: Vec::new(),
            lights: config.lights.map(|light| Light::new(&light)),
            camera: Camera::from(&config.camera),
            projection: ProjectionMode::default(),
            selected: None,
            animating: false,
            object_counter: 0,
            picker_color: config.object_defaults.color_hex.clone(),
            bounds: config.bounds,
            default_camera: config.camera,
            object_defaults: config.object_defaults.clone(),
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|obj| obj.name() == name)
    }

    /// Object names in draw order, for UI display
    pub fn object_names(&self) -> Vec<String> {
        self.objects.iter().map(|obj| obj.name().to_string()).collect()
    }

    pub fn lights(&self) -> &[Light; LIGHT_COUNT] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn bounds(&self) -> &TransformBounds {
        &self.bounds
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn picker_color(&self) -> &str {
        &self.picker_color
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&SceneObject> {
        self.selected.as_deref().and_then(|name| self.object(name))
    }

    fn selected_mut(&mut self) -> Result<&mut SceneObject, SceneError> {
        let name = self.selected.as_deref().ok_or(SceneError::NoSelection)?;
        self.objects
            .iter_mut()
            .find(|obj| obj.name() == name)
            .ok_or(SceneError::NoSelection)
    }

    fn select_index(&mut self, index: Option<usize>) {
        self.selected = index.map(|i| self.objects[i].name().to_string());
        if let Some(obj) = self.selected() {
            self.picker_color = to_hex_color(obj.color());
        }
    }

    /// Applies one action atomically
    pub fn apply(&mut self, action: EditorAction) -> Result<(), SceneError> {
        match action {
            EditorAction::CreateObject(kind) => self.create_object(kind).map(|_| ()),
            EditorAction::DeleteObject(name) => self.delete_object(&name),
            EditorAction::SelectObject(name) => self.select_object(&name),
            EditorAction::SetTransform {
                scale,
                rotate,
                translate,
            } => self.set_transform(Transform::new(scale, rotate, translate)),
            EditorAction::SetColor(hex) => self.set_color(&hex),
            EditorAction::SetCamera { eye, look_at } => {
                self.set_camera(eye, look_at);
                Ok(())
            }
            EditorAction::SetProjection(mode) => {
                self.set_projection(mode);
                Ok(())
            }
            EditorAction::SetAnimating(animating) => {
                self.set_animating(animating);
                Ok(())
            }
            EditorAction::DragSelected { dx, dy } => self.drag_selected(dx, dy),
            EditorAction::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Applies queued actions in order; rejected ones are logged and skipped
    ///
    /// Returns the number of rejected actions.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = EditorAction>) -> usize {
        let mut rejected = 0;
        for action in actions {
            let description = format!("{:?}", action);
            if let Err(e) = self.apply(action) {
                warn!("Rejected {}: {}", description, e);
                rejected += 1;
            }
        }
        rejected
    }

    /// Creates `<kind><n>` with default material, scale and the picker colour,
    /// placed at the camera's look-at point, and selects it
    pub fn create_object(&mut self, kind: PrimitiveKind) -> Result<&SceneObject, SceneError> {
        let color = parse_hex_color(&self.picker_color)?;

        self.object_counter += 1;
        let name = format!("{}{}", kind, self.object_counter);

        let mut object = SceneObject::new(name.clone(), kind, self.object_defaults.material);
        object.set_color(color);
        let look_at = self.camera.look_at;
        object.set_transform(
            Transform::new(
                self.object_defaults.scale,
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(look_at.x, look_at.y, look_at.z),
            ),
            &self.bounds,
        );

        info!("Created object '{}'", name);
        self.objects.push(object);
        self.select_index(Some(self.objects.len() - 1));

        Ok(&self.objects[self.objects.len() - 1])
    }

    /// Like [`create_object`](Self::create_object), for a type name such as `"cone"`
    pub fn create_object_by_name(&mut self, type_name: &str) -> Result<&SceneObject, SceneError> {
        let kind: PrimitiveKind = type_name.parse()?;
        self.create_object(kind)
    }

    /// Removes an object; if it was selected, the first remaining object
    /// becomes the selection
    pub fn delete_object(&mut self, name: &str) -> Result<(), SceneError> {
        let index = self
            .objects
            .iter()
            .position(|obj| obj.name() == name)
            .ok_or_else(|| SceneError::UnknownObject(name.to_string()))?;

        self.objects.remove(index);
        info!("Deleted object '{}'", name);

        if self.selected.as_deref() == Some(name) {
            let next = if self.objects.is_empty() { None } else { Some(0) };
            self.select_index(next);
        }
        Ok(())
    }

    pub fn select_object(&mut self, name: &str) -> Result<(), SceneError> {
        let index = self
            .objects
            .iter()
            .position(|obj| obj.name() == name)
            .ok_or_else(|| SceneError::UnknownObject(name.to_string()))?;

        self.select_index(Some(index));
        debug!("Selected object '{}'", name);
        Ok(())
    }

    /// Replaces the selected object's transform (rotation and translation clamped)
    pub fn set_transform(&mut self, transform: Transform) -> Result<(), SceneError> {
        let bounds = self.bounds;
        self.selected_mut()?.set_transform(transform, &bounds);
        Ok(())
    }

    /// Recolours the selected object; malformed input leaves it unchanged
    pub fn set_color(&mut self, hex: &str) -> Result<(), SceneError> {
        let object = self.selected_mut()?;
        let color = parse_hex_color(hex)?;
        object.set_color(color);
        self.picker_color = to_hex_color(color);
        Ok(())
    }

    /// Overwrites the selected object's material terms
    pub fn set_material(&mut self, material: Material) -> Result<(), SceneError> {
        let object = self.selected_mut()?;
        object.set_color(material.diffuse.into());
        object.material = material;
        Ok(())
    }

    pub fn set_camera(&mut self, eye: Point3<f32>, look_at: Point3<f32>) {
        self.camera.eye = eye;
        self.camera.look_at = look_at;
    }

    pub fn set_projection(&mut self, mode: ProjectionMode) {
        self.projection = mode;
    }

    pub fn set_animating(&mut self, animating: bool) {
        if self.animating != animating {
            info!("Animation {}", if animating { "started" } else { "stopped" });
        }
        self.animating = animating;
    }

    /// Moves the selected object in its X/Y plane by a pointer drag,
    /// truncating the result to whole units
    pub fn drag_selected(&mut self, dx: f32, dy: f32) -> Result<(), SceneError> {
        let bounds = self.bounds;
        let object = self.selected_mut()?;

        let mut transform = *object.transform();
        transform.translate.x = (transform.translate.x + dx).trunc();
        transform.translate.y = (transform.translate.y + dy).trunc();
        object.set_transform(transform, &bounds);
        Ok(())
    }

    /// Empties the scene and restores the default camera
    pub fn reset(&mut self) {
        self.objects.clear();
        self.selected = None;
        self.object_counter = 0;
        self.camera = Camera::from(&self.default_camera);
        info!("Scene reset");
    }

    /// Advances every light's orbit by one frame
    pub fn advance_lights(&mut self) {
        for light in &mut self.lights {
            light.advance();
        }
    }

    /// Creates the four start-up objects and turns animation on
    pub fn populate_demo(&mut self) -> Result<(), SceneError> {
        struct Demo {
            kind: PrimitiveKind,
            color: [f32; 4],
            specular: Option<[f32; 4]>,
            shininess: f32,
            scale: [f32; 3],
            rotate: [f32; 3],
            translate: [f32; 3],
        }

        let demos = [
            Demo {
                kind: PrimitiveKind::Cube,
                color: [0.8, 0.3, 0.2, 1.0],
                specular: Some([0.3, 0.3, 0.3, 1.0]),
                shininess: 25.0,
                scale: [60.0, 50.0, 50.0],
                rotate: [140.0, 40.0, 0.0],
                translate: [-500.0, 750.0, 0.0],
            },
            Demo {
                kind: PrimitiveKind::Sphere,
                color: [0.1, 0.8, 1.0, 1.0],
                specular: Some([0.8, 0.8, 0.8, 1.0]),
                shininess: 140.0,
                scale: [200.0, 200.0, 200.0],
                rotate: [0.0, 0.0, 0.0],
                translate: [0.0, 500.0, 0.0],
            },
            Demo {
                kind: PrimitiveKind::Cone,
                color: [0.5, 0.8, 0.2, 1.0],
                specular: None,
                shininess: 50.0,
                scale: [100.0, 100.0, 100.0],
                rotate: [-65.0, 20.0, 50.0],
                translate: [500.0, 250.0, 0.0],
            },
            Demo {
                kind: PrimitiveKind::Cylinder,
                color: [0.5, 0.1, 0.8, 1.0],
                specular: None,
                shininess: 75.0,
                scale: [60.0, 180.0, 60.0],
                rotate: [-65.0, 20.0, 50.0],
                translate: [-500.0, 250.0, 0.0],
            },
        ];

        for demo in demos {
            self.create_object(demo.kind)?;

            let mut material = self.object_defaults.material;
            material.diffuse = demo.color.into();
            if let Some(specular) = demo.specular {
                material.specular = Vector4::from(specular);
            }
            material.shininess = demo.shininess;
            self.set_material(material)?;

            self.set_transform(Transform::new(
                demo.scale.into(),
                demo.rotate.into(),
                demo.translate.into(),
            ))?;
            self.picker_color = to_hex_color(demo.color);
        }

        self.set_animating(true);
        Ok(())
    }

    /// Gets statistics about the scene
    pub fn statistics(&self, library: &MeshLibrary) -> SceneStatistics {
        let mut stats = SceneStatistics {
            object_count: self.objects.len(),
            light_count: self.lights.len(),
            ..Default::default()
        };

        for object in &self.objects {
            let handle = library.get(object.kind()).handle();
            stats.total_triangles += handle.triangle_count;
            stats.total_vertices += handle.vertex_count;
        }
        stats
    }
}

/// Scene statistics for the UI
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub light_count: usize,
    /// Triangles drawn per frame across all objects
    pub total_triangles: u32,
    /// Template vertices referenced by all objects
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::HeadlessBackend;
    use crate::gfx::geometry::ArenaCapacity;

    fn empty_scene() -> Scene {
        Scene::new(&EditorConfig::default())
    }

    #[test]
    fn test_create_object_defaults() {
        let mut scene = empty_scene();
        let object = scene.create_object(PrimitiveKind::Sphere).unwrap();

        assert_eq!(object.name(), "sphere1");
        assert_eq!(object.transform().scale, Vector3::new(50.0, 50.0, 50.0));
        assert_eq!(object.transform().translate, Vector3::new(0.0, 500.0, 0.0));
        assert_eq!(object.color(), parse_hex_color("#20d0ff").unwrap());
        assert_eq!(object.material.diffuse, Vector4::from(object.color()));
        assert_eq!(object.material.shininess, 15.0);
        assert_eq!(scene.selected_name(), Some("sphere1"));
    }

    #[test]
    fn test_names_use_running_counter() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Cube).unwrap();
        scene.create_object(PrimitiveKind::Cone).unwrap();
        scene.delete_object("cube1").unwrap();
        scene.create_object(PrimitiveKind::Cube).unwrap();

        assert_eq!(scene.object_names(), vec!["cone2", "cube3"]);

        scene.reset();
        scene.create_object(PrimitiveKind::Cylinder).unwrap();
        assert_eq!(scene.object_names(), vec!["cylinder1"]);
    }

    #[test]
    fn test_sphere_scale_and_translate_end_to_end() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Sphere).unwrap();
        scene
            .apply(EditorAction::SetTransform {
                scale: Vector3::new(200.0, 200.0, 200.0),
                rotate: Vector3::new(0.0, 0.0, 0.0),
                translate: Vector3::new(0.0, 500.0, 0.0),
            })
            .unwrap();

        let sphere = scene.selected().unwrap();
        let origin = sphere.model_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(0.0, 500.0, 0.0, 1.0));
    }

    #[test]
    fn test_create_by_type_name() {
        let mut scene = empty_scene();
        assert_eq!(
            scene.create_object_by_name("cone").unwrap().kind(),
            PrimitiveKind::Cone
        );
        assert_eq!(
            scene.create_object_by_name("torus").unwrap_err(),
            SceneError::UnknownPrimitive(UnknownPrimitive("torus".to_string()))
        );
        assert_eq!(scene.objects().len(), 1);
    }

    #[test]
    fn test_delete_selected_selects_first_remaining() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Cube).unwrap();
        scene.create_object(PrimitiveKind::Sphere).unwrap();
        scene.create_object(PrimitiveKind::Cone).unwrap();

        scene.delete_object("cone3").unwrap();
        assert_eq!(scene.selected_name(), Some("cube1"));

        scene.delete_object("sphere2").unwrap();
        assert_eq!(scene.selected_name(), Some("cube1"));

        scene.delete_object("cube1").unwrap();
        assert_eq!(scene.selected_name(), None);
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_unknown_names_change_nothing() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Cube).unwrap();

        assert_eq!(
            scene.select_object("ghost"),
            Err(SceneError::UnknownObject("ghost".to_string()))
        );
        assert_eq!(
            scene.delete_object("ghost"),
            Err(SceneError::UnknownObject("ghost".to_string()))
        );
        assert_eq!(scene.selected_name(), Some("cube1"));
        assert_eq!(scene.objects().len(), 1);
    }

    #[test]
    fn test_edits_require_selection() {
        let mut scene = empty_scene();
        assert_eq!(scene.set_color("#ffffff"), Err(SceneError::NoSelection));
        assert_eq!(
            scene.set_transform(Transform::default()),
            Err(SceneError::NoSelection)
        );
        assert_eq!(scene.drag_selected(1.0, 1.0), Err(SceneError::NoSelection));
    }

    #[test]
    fn test_malformed_color_keeps_previous() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Cone).unwrap();
        scene.set_color("#804020").unwrap();
        let before = scene.selected().unwrap().color();

        assert!(matches!(
            scene.set_color("#80402"),
            Err(SceneError::Color(ColorParseError::BadLength(_)))
        ));
        assert_eq!(scene.selected().unwrap().color(), before);
        assert_eq!(scene.picker_color(), "#804020");
    }

    #[test]
    fn test_drag_truncates_and_clamps() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Cube).unwrap();

        scene.drag_selected(10.7, -3.2).unwrap();
        let t = scene.selected().unwrap().transform().translate;
        assert_eq!(t, Vector3::new(10.0, 496.0, 0.0));

        scene.drag_selected(5000.0, 5000.0).unwrap();
        let t = scene.selected().unwrap().transform().translate;
        assert_eq!(t, Vector3::new(1000.0, 1000.0, 0.0));
    }

    #[test]
    fn test_reset_restores_camera_only() {
        let mut scene = empty_scene();
        scene.create_object(PrimitiveKind::Cube).unwrap();
        scene.set_camera(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0));
        scene.set_projection(ProjectionMode::Orthographic);
        scene.set_animating(true);
        scene.advance_lights();

        scene.reset();

        assert!(scene.objects().is_empty());
        assert_eq!(scene.selected_name(), None);
        assert_eq!(*scene.camera(), Camera::default());
        assert_eq!(scene.projection(), ProjectionMode::Orthographic);
        assert!(scene.is_animating());
        assert_eq!(scene.lights()[0].rotate, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_demo_scene() {
        let mut scene = empty_scene();
        scene.populate_demo().unwrap();

        assert_eq!(
            scene.object_names(),
            vec!["cube1", "sphere2", "cone3", "cylinder4"]
        );
        assert_eq!(scene.selected_name(), Some("cylinder4"));
        assert!(scene.is_animating());

        let cube = scene.object("cube1").unwrap();
        assert_eq!(cube.transform().rotate, Vector3::new(140.0, 40.0, 0.0));
        assert_eq!(cube.material.specular, Vector4::new(0.3, 0.3, 0.3, 1.0));
        assert_eq!(cube.color(), [0.8, 0.3, 0.2, 1.0]);

        let cone = scene.object("cone3").unwrap();
        assert_eq!(cone.material.specular, Material::default().specular);
        assert_eq!(cone.material.shininess, 50.0);
    }

    #[test]
    fn test_apply_all_counts_rejections() {
        let mut scene = empty_scene();
        let rejected = scene.apply_all([
            EditorAction::CreateObject(PrimitiveKind::Cone),
            EditorAction::SetColor("red".to_string()),
            EditorAction::SelectObject("nope".to_string()),
            EditorAction::SetProjection(ProjectionMode::Orthographic),
        ]);

        assert_eq!(rejected, 2);
        assert_eq!(scene.objects().len(), 1);
        assert_eq!(scene.projection(), ProjectionMode::Orthographic);
    }

    #[test]
    fn test_statistics() {
        let mut backend = HeadlessBackend::new();
        let config = EditorConfig::default();
        let library =
            MeshLibrary::build(&mut backend, ArenaCapacity::default(), &config.templates).unwrap();

        let mut scene = Scene::new(&config);
        scene.create_object(PrimitiveKind::Cube).unwrap();
        scene.create_object(PrimitiveKind::Cone).unwrap();

        let stats = scene.statistics(&library);
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.light_count, 2);
        assert_eq!(stats.total_triangles, 16 + 240);
    }
}
