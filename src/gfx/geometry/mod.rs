//! # Procedural Geometry
//!
//! Every primitive the editor can place is generated procedurally, once, at
//! start-up and packed into a shared [`GeometryArena`]. Scene objects never own
//! geometry; they reference a [`MeshTemplate`] through the [`MeshLibrary`].
//!
//! ## Primitives
//!
//! - **Icosphere**: indexed, shared-vertex unit sphere built by subdividing an
//!   icosahedron (smooth normals)
//! - **Cone**: flat-shaded triangle soup, base circle at `y = -1`, apex at `y = 1`
//! - **Cylinder**: flat-shaded triangle soup between the circles at `y = -1` and `y = 1`
//!
//! ## Usage
//!
//! ```rust
//! use solids::gfx::geometry::{icosphere, cone};
//!
//! let sphere = icosphere(2);
//! assert_eq!(sphere.vertex_count(), 162);
//!
//! let cone = cone(90.0);
//! assert_eq!(cone.triangle_count(), 8);
//! ```

pub mod arena;
pub mod primitives;
pub mod template;

pub use arena::{ArenaCapacity, ArenaError, GeometryArena, PoolKind};
pub use primitives::*;
pub use template::{
    MeshGenerator, MeshHandle, MeshLibrary, MeshShape, MeshTemplate, PrimitiveKind,
};

/// Generated geometry ready to be packed into the arena
///
/// Indexed meshes fill `indices` with mesh-local vertex indices; triangle soups
/// leave it empty and list three vertices per triangle.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z), one per vertex
    pub normals: Vec<[f32; 3]>,
    /// Mesh-local triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        if self.is_indexed() {
            self.indices.len() / 3
        } else {
            self.vertices.len() / 3
        }
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }
}
