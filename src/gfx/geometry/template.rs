//! # Mesh Templates
//!
//! One generated mesh per primitive type, shared read-only by every scene
//! object of that type. Templates are built once by [`MeshLibrary::build`],
//! which packs them into the [`GeometryArena`] in [`PrimitiveKind::ALL`] order,
//! and are never modified afterwards.

use super::arena::{ArenaCapacity, ArenaError, GeometryArena};
use super::{primitives, GeometryData};
use crate::config::TemplateConfig;
use crate::gfx::backend::{BackendError, ProgramBindings, RenderBackend};
use log::info;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Generation algorithm of a template
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshShape {
    /// Indexed unit sphere subdivided `recurse` times
    Icosphere { recurse: u32 },
    /// Flat-shaded cone with an angular step in degrees
    Cone { angle_deg: f32 },
    /// Flat-shaded cylinder with an angular step in degrees
    Cylinder { angle_deg: f32 },
}

impl MeshShape {
    /// Runs the generator on the CPU
    pub fn geometry(&self) -> GeometryData {
        match *self {
            MeshShape::Icosphere { recurse } => primitives::icosphere(recurse),
            MeshShape::Cone { angle_deg } => primitives::cone(angle_deg),
            MeshShape::Cylinder { angle_deg } => primitives::cylinder(angle_deg),
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, MeshShape::Icosphere { .. })
    }
}

/// Where a template's geometry lives in the arena
///
/// `index_offset` and `index_count` are only meaningful for indexed shapes;
/// triangle soups leave them at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshHandle {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
    pub triangle_count: u32,
}

/// Generation and draw capability of a mesh template
pub trait MeshGenerator {
    /// Generates the geometry into the arena and records where it went
    fn generate<B: RenderBackend + ?Sized>(
        &self,
        arena: &mut GeometryArena,
        backend: &mut B,
    ) -> Result<MeshHandle, ArenaError>;

    /// Issues the single draw call covering the recorded range
    fn issue_draw<B: RenderBackend + ?Sized>(
        &self,
        handle: &MeshHandle,
        backend: &mut B,
    ) -> Result<(), BackendError>;
}

impl MeshGenerator for MeshShape {
    fn generate<B: RenderBackend + ?Sized>(
        &self,
        arena: &mut GeometryArena,
        backend: &mut B,
    ) -> Result<MeshHandle, ArenaError> {
        let data = self.geometry();
        arena.check_room(data.vertex_count(), data.indices.len())?;

        let vertex_offset = arena.append_vertices(backend, &data.vertices)?;
        arena.append_normals(backend, &data.normals)?;

        let mut handle = MeshHandle {
            vertex_offset,
            vertex_count: data.vertex_count() as u32,
            triangle_count: data.triangle_count() as u32,
            ..Default::default()
        };

        if data.is_indexed() {
            handle.index_offset = arena.append_index_block(backend, &data.indices, vertex_offset)?;
            handle.index_count = data.indices.len() as u32;
        }

        Ok(handle)
    }

    fn issue_draw<B: RenderBackend + ?Sized>(
        &self,
        handle: &MeshHandle,
        backend: &mut B,
    ) -> Result<(), BackendError> {
        if self.is_indexed() {
            backend.draw_indexed(
                handle.index_count,
                handle.index_offset as u64 * super::arena::INDEX_STRIDE,
            )
        } else {
            backend.draw_arrays(handle.vertex_offset, handle.triangle_count * 3)
        }
    }
}

/// The primitive types an object can be created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cone,
    Cylinder,
}

impl PrimitiveKind {
    /// All kinds, in template generation order
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Cube,
        PrimitiveKind::Sphere,
        PrimitiveKind::Cone,
        PrimitiveKind::Cylinder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Cube => "cube",
            PrimitiveKind::Sphere => "sphere",
            PrimitiveKind::Cone => "cone",
            PrimitiveKind::Cylinder => "cylinder",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown primitive type '{0}'")]
pub struct UnknownPrimitive(pub String);

impl FromStr for PrimitiveKind {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownPrimitive(s.to_string()))
    }
}

/// A generated mesh shared by every object of one primitive kind
#[derive(Debug, Clone)]
pub struct MeshTemplate {
    kind: PrimitiveKind,
    shape: MeshShape,
    handle: MeshHandle,
}

impl MeshTemplate {
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn shape(&self) -> MeshShape {
        self.shape
    }

    pub fn handle(&self) -> &MeshHandle {
        &self.handle
    }

    /// Draws the template with whatever uniforms are currently bound
    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> Result<(), BackendError> {
        self.shape.issue_draw(&self.handle, backend)
    }
}

/// Registry of the process-wide mesh templates, keyed by [`PrimitiveKind`]
#[derive(Debug)]
pub struct MeshLibrary {
    arena: GeometryArena,
    templates: Vec<MeshTemplate>,
}

impl MeshLibrary {
    /// Allocates the arena and generates every template into it
    ///
    /// Any [`ArenaError`] here means the configured capacity cannot hold the
    /// configured templates; callers treat it as fatal.
    pub fn build<B: RenderBackend + ?Sized>(
        backend: &mut B,
        capacity: ArenaCapacity,
        config: &TemplateConfig,
    ) -> Result<Self, ArenaError> {
        let mut arena = GeometryArena::allocate(backend, capacity)?;
        let mut templates = Vec::with_capacity(PrimitiveKind::ALL.len());

        for kind in PrimitiveKind::ALL {
            let shape = config.shape_for(kind);
            let handle = shape.generate(&mut arena, backend)?;
            info!(
                "Generated {} template ({:?}): {} vertices at {}, {} indices at {}, {} triangles",
                kind,
                shape,
                handle.vertex_count,
                handle.vertex_offset,
                handle.index_count,
                handle.index_offset,
                handle.triangle_count
            );
            templates.push(MeshTemplate {
                kind,
                shape,
                handle,
            });
        }

        info!(
            "Mesh library ready: {}/{} vertices, {}/{} indices used",
            arena.vertex_cursor(),
            capacity.vertices,
            arena.index_cursor(),
            capacity.indices
        );

        Ok(Self { arena, templates })
    }

    pub fn get(&self, kind: PrimitiveKind) -> &MeshTemplate {
        &self.templates[kind.slot()]
    }

    pub fn templates(&self) -> impl Iterator<Item = &MeshTemplate> {
        self.templates.iter()
    }

    pub fn arena(&self) -> &GeometryArena {
        &self.arena
    }

    pub fn bindings(&self) -> ProgramBindings {
        self.arena.bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::{BackendCommand, HeadlessBackend};

    fn default_library(backend: &mut HeadlessBackend) -> MeshLibrary {
        MeshLibrary::build(backend, ArenaCapacity::default(), &TemplateConfig::default()).unwrap()
    }

    #[test]
    fn test_primitive_kind_parsing() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.to_string().parse::<PrimitiveKind>(), Ok(kind));
        }
        assert_eq!(
            "torus".parse::<PrimitiveKind>(),
            Err(UnknownPrimitive("torus".to_string()))
        );
    }

    #[test]
    fn test_default_template_sizes() {
        let mut backend = HeadlessBackend::new();
        let library = default_library(&mut backend);

        let cube = library.get(PrimitiveKind::Cube).handle();
        assert_eq!(cube.triangle_count, 16);
        assert_eq!(cube.vertex_count, 48);

        let sphere = library.get(PrimitiveKind::Sphere).handle();
        assert_eq!(sphere.vertex_count, 2562);
        assert_eq!(sphere.index_count, 15360);
        assert_eq!(sphere.triangle_count, 5120);

        let cone = library.get(PrimitiveKind::Cone).handle();
        assert_eq!(cone.vertex_count, 720);

        let cylinder = library.get(PrimitiveKind::Cylinder).handle();
        assert_eq!(cylinder.vertex_count, 1440);

        assert_eq!(library.arena().vertex_cursor(), 48 + 2562 + 720 + 1440);
        assert_eq!(library.arena().index_cursor(), 15360);
    }

    #[test]
    fn test_templates_occupy_disjoint_increasing_ranges() {
        let mut backend = HeadlessBackend::new();
        let library = default_library(&mut backend);

        let mut next_vertex = 0;
        let mut next_index = 0;
        for template in library.templates() {
            let handle = template.handle();
            assert!(handle.vertex_offset >= next_vertex);
            next_vertex = handle.vertex_offset + handle.vertex_count;
            if handle.index_count > 0 {
                assert!(handle.index_offset >= next_index);
                next_index = handle.index_offset + handle.index_count;
            }
        }
        let arena = library.arena();
        assert_eq!(arena.normal_cursor(), arena.vertex_cursor());
        assert_eq!(next_vertex as usize, arena.vertex_cursor());
        assert_eq!(next_index as usize, arena.index_cursor());
        assert!(arena.vertex_cursor() <= arena.capacity().vertices);
        assert!(arena.index_cursor() <= arena.capacity().indices);
    }

    #[test]
    fn test_normals_stay_paired_with_positions() {
        let mut backend = HeadlessBackend::new();
        let mut arena = GeometryArena::allocate(&mut backend, ArenaCapacity::default()).unwrap();

        let shapes = [
            MeshShape::Cylinder { angle_deg: 90.0 },
            MeshShape::Icosphere { recurse: 1 },
            MeshShape::Cone { angle_deg: 30.0 },
            MeshShape::Cylinder { angle_deg: 30.0 },
        ];
        for shape in shapes {
            let handle = shape.generate(&mut arena, &mut backend).unwrap();
            assert_eq!(arena.normal_cursor(), arena.vertex_cursor());
            assert_eq!(
                (handle.vertex_offset + handle.vertex_count) as usize,
                arena.vertex_cursor()
            );
        }
    }

    #[test]
    fn test_unaddressable_sphere_fails_before_writing() {
        let mut backend = HeadlessBackend::new();
        let mut arena = GeometryArena::allocate(
            &mut backend,
            ArenaCapacity {
                vertices: 70_000,
                indices: 1_000,
            },
        )
        .unwrap();
        arena
            .append_vertices(&mut backend, &vec![[0.0; 3]; 65_530])
            .unwrap();
        arena
            .append_normals(&mut backend, &vec![[0.0, 1.0, 0.0]; 65_530])
            .unwrap();

        let result = MeshShape::Icosphere { recurse: 0 }.generate(&mut arena, &mut backend);

        assert!(matches!(result, Err(ArenaError::IndexOverflow { .. })));
        assert_eq!(arena.vertex_cursor(), 65_530);
        assert_eq!(arena.normal_cursor(), 65_530);
        assert_eq!(arena.index_cursor(), 0);
        let tail = backend
            .read_vec3s(arena.bindings().positions, 65_530, 12)
            .unwrap();
        assert!(tail.iter().all(|p| *p == [0.0; 3]));
    }

    #[test]
    fn test_sphere_indices_address_sphere_vertices() {
        let mut backend = HeadlessBackend::new();
        let library = default_library(&mut backend);
        let sphere = library.get(PrimitiveKind::Sphere).handle();

        let indices = backend
            .read_u16s(
                library.bindings().indices,
                sphere.index_offset as usize,
                sphere.index_count as usize,
            )
            .unwrap();
        let range = sphere.vertex_offset..sphere.vertex_offset + sphere.vertex_count;
        assert!(indices.iter().all(|&i| range.contains(&(i as u32))));
    }

    #[test]
    fn test_draw_contracts() {
        let mut backend = HeadlessBackend::new();
        let library = default_library(&mut backend);
        backend.bind_program(library.bindings()).unwrap();
        backend.take_commands();

        library.get(PrimitiveKind::Sphere).draw(&mut backend).unwrap();
        library.get(PrimitiveKind::Cone).draw(&mut backend).unwrap();

        let sphere = library.get(PrimitiveKind::Sphere).handle();
        let cone = library.get(PrimitiveKind::Cone).handle();
        assert_eq!(
            backend.commands(),
            &[
                BackendCommand::DrawIndexed {
                    count: sphere.index_count,
                    byte_offset: sphere.index_offset as u64 * 2,
                },
                BackendCommand::DrawArrays {
                    first: cone.vertex_offset,
                    count: cone.triangle_count * 3,
                },
            ]
        );
    }

    #[test]
    fn test_too_small_arena_fails_before_writing() {
        let mut backend = HeadlessBackend::new();
        let capacity = ArenaCapacity {
            vertices: 1000,
            indices: 40_000,
        };

        let result = MeshLibrary::build(&mut backend, capacity, &TemplateConfig::default());
        assert!(matches!(result, Err(ArenaError::CapacityExceeded { .. })));
    }
}
