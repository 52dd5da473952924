//! # Geometry Arena
//!
//! Append-only, fixed-capacity storage backing every mesh template. Three
//! parallel pools live in backend buffers allocated once at start-up:
//!
//! | Pool      | Element     | Size     | Capacity              |
//! |-----------|-------------|----------|-----------------------|
//! | positions | `[f32; 3]`  | 12 bytes | [`ArenaCapacity::vertices`] |
//! | normals   | `[f32; 3]`  | 12 bytes | [`ArenaCapacity::vertices`] |
//! | indices   | `u16`       | 2 bytes  | [`ArenaCapacity::indices`]  |
//!
//! Each pool has its own write cursor that only moves forward. Running out of
//! room is a configuration error: the capacity has to cover every template and
//! is checked before anything is written.

use crate::gfx::backend::{BackendError, BufferId, BufferKind, ProgramBindings, RenderBackend};
use log::{debug, info};
use thiserror::Error;

/// Default vertex capacity of the position and normal pools
pub const NUM_VERTS: usize = 50_000;
/// Default capacity of the index pool
pub const NUM_ELEMS: usize = 40_000;

/// Size in bytes of one position or normal element
pub const VERTEX_STRIDE: u64 = 12;
/// Size in bytes of one index element
pub const INDEX_STRIDE: u64 = 2;

/// Element capacities of the arena pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCapacity {
    /// Shared capacity of the position and normal pools
    pub vertices: usize,
    /// Capacity of the index pool
    pub indices: usize,
}

impl Default for ArenaCapacity {
    fn default() -> Self {
        Self {
            vertices: NUM_VERTS,
            indices: NUM_ELEMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Positions,
    Normals,
    Indices,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PoolKind::Positions => "positions",
            PoolKind::Normals => "normals",
            PoolKind::Indices => "indices",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("{pool} pool exhausted: {requested} more elements requested, {used} of {capacity} in use")]
    CapacityExceeded {
        pool: PoolKind,
        requested: usize,
        used: usize,
        capacity: usize,
    },

    #[error("vertex index {index} does not fit in 16 bits")]
    IndexOverflow { index: u64 },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Fixed-capacity geometry store shared by all mesh templates
#[derive(Debug)]
pub struct GeometryArena {
    capacity: ArenaCapacity,
    positions: BufferId,
    normals: BufferId,
    indices: BufferId,
    vertex_cursor: usize,
    normal_cursor: usize,
    index_cursor: usize,
}

impl GeometryArena {
    /// Allocates the three pool buffers through `backend`
    pub fn allocate<B: RenderBackend + ?Sized>(
        backend: &mut B,
        capacity: ArenaCapacity,
    ) -> Result<Self, ArenaError> {
        let vertex_bytes = capacity.vertices as u64 * VERTEX_STRIDE;
        let index_bytes = capacity.indices as u64 * INDEX_STRIDE;

        let positions = backend.create_buffer(BufferKind::Vertex, vertex_bytes, "Arena Positions")?;
        let normals = backend.create_buffer(BufferKind::Vertex, vertex_bytes, "Arena Normals")?;
        let indices = backend.create_buffer(BufferKind::Index, index_bytes, "Arena Indices")?;

        info!(
            "Geometry arena allocated: {} vertices, {} indices ({} bytes)",
            capacity.vertices,
            capacity.indices,
            2 * vertex_bytes + index_bytes
        );

        Ok(Self {
            capacity,
            positions,
            normals,
            indices,
            vertex_cursor: 0,
            normal_cursor: 0,
            index_cursor: 0,
        })
    }

    pub fn capacity(&self) -> ArenaCapacity {
        self.capacity
    }

    /// Next free element in the position pool
    pub fn vertex_cursor(&self) -> usize {
        self.vertex_cursor
    }

    /// Next free element in the normal pool
    pub fn normal_cursor(&self) -> usize {
        self.normal_cursor
    }

    /// Next free element in the index pool
    pub fn index_cursor(&self) -> usize {
        self.index_cursor
    }

    /// Buffer bindings for the shading program
    pub fn bindings(&self) -> ProgramBindings {
        ProgramBindings {
            positions: self.positions,
            normals: self.normals,
            indices: self.indices,
        }
    }

    /// Checks that `vertices` more positions and normals and `indices` more
    /// indices fit, without writing anything
    ///
    /// With `indices > 0` the mesh is indexed, so its last vertex must also
    /// be addressable by a 16-bit index once rebased.
    pub fn check_room(&self, vertices: usize, indices: usize) -> Result<(), ArenaError> {
        if indices > 0 && vertices > 0 {
            let last = (self.vertex_cursor + vertices - 1) as u64;
            u16::try_from(last).map_err(|_| ArenaError::IndexOverflow { index: last })?;
        }
        Self::reserve(
            PoolKind::Positions,
            self.vertex_cursor,
            vertices,
            self.capacity.vertices,
        )?;
        Self::reserve(
            PoolKind::Normals,
            self.normal_cursor,
            vertices,
            self.capacity.vertices,
        )?;
        Self::reserve(
            PoolKind::Indices,
            self.index_cursor,
            indices,
            self.capacity.indices,
        )
    }

    fn reserve(
        pool: PoolKind,
        cursor: usize,
        requested: usize,
        capacity: usize,
    ) -> Result<(), ArenaError> {
        if cursor + requested > capacity {
            return Err(ArenaError::CapacityExceeded {
                pool,
                requested,
                used: cursor,
                capacity,
            });
        }
        Ok(())
    }

    /// Appends one position and returns its element index
    pub fn append_vertex<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        position: [f32; 3],
    ) -> Result<u32, ArenaError> {
        self.append_vertices(backend, &[position])
    }

    /// Appends a run of positions and returns the index of the first one
    pub fn append_vertices<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        positions: &[[f32; 3]],
    ) -> Result<u32, ArenaError> {
        Self::reserve(
            PoolKind::Positions,
            self.vertex_cursor,
            positions.len(),
            self.capacity.vertices,
        )?;

        let start = self.vertex_cursor;
        backend.write_buffer(
            self.positions,
            start as u64 * VERTEX_STRIDE,
            bytemuck::cast_slice(positions),
        )?;
        self.vertex_cursor += positions.len();
        Ok(start as u32)
    }

    /// Appends one normal and returns its element index
    pub fn append_normal<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        normal: [f32; 3],
    ) -> Result<u32, ArenaError> {
        self.append_normals(backend, &[normal])
    }

    /// Appends a run of normals and returns the index of the first one
    pub fn append_normals<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        normals: &[[f32; 3]],
    ) -> Result<u32, ArenaError> {
        Self::reserve(
            PoolKind::Normals,
            self.normal_cursor,
            normals.len(),
            self.capacity.vertices,
        )?;

        let start = self.normal_cursor;
        backend.write_buffer(
            self.normals,
            start as u64 * VERTEX_STRIDE,
            bytemuck::cast_slice(normals),
        )?;
        self.normal_cursor += normals.len();
        Ok(start as u32)
    }

    /// Appends a block of mesh-local indices, rebased onto `base_vertex`
    ///
    /// Every index is shifted by `base_vertex` so it addresses the mesh's
    /// global vertex range; the rebased value must fit in 16 bits. Returns the
    /// element offset of the block in the index pool. Nothing is written
    /// unless the whole block fits.
    pub fn append_index_block<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        local_indices: &[u32],
        base_vertex: u32,
    ) -> Result<u32, ArenaError> {
        Self::reserve(
            PoolKind::Indices,
            self.index_cursor,
            local_indices.len(),
            self.capacity.indices,
        )?;

        let rebased = local_indices
            .iter()
            .map(|&i| {
                let global = i as u64 + base_vertex as u64;
                u16::try_from(global).map_err(|_| ArenaError::IndexOverflow { index: global })
            })
            .collect::<Result<Vec<u16>, _>>()?;

        let start = self.index_cursor;
        backend.write_buffer(
            self.indices,
            start as u64 * INDEX_STRIDE,
            bytemuck::cast_slice(&rebased),
        )?;
        self.index_cursor += rebased.len();

        debug!(
            "Index block of {} written at {} (base vertex {})",
            rebased.len(),
            start,
            base_vertex
        );
        Ok(start as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::HeadlessBackend;

    fn small_arena(backend: &mut HeadlessBackend) -> GeometryArena {
        GeometryArena::allocate(
            backend,
            ArenaCapacity {
                vertices: 8,
                indices: 6,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_default_capacity() {
        let capacity = ArenaCapacity::default();
        assert_eq!(capacity.vertices, 50_000);
        assert_eq!(capacity.indices, 40_000);
    }

    #[test]
    fn test_allocation_sizes() {
        let mut backend = HeadlessBackend::new();
        let arena = small_arena(&mut backend);
        let bindings = arena.bindings();

        assert_eq!(backend.buffer_bytes(bindings.positions).unwrap().len(), 96);
        assert_eq!(backend.buffer_bytes(bindings.normals).unwrap().len(), 96);
        assert_eq!(backend.buffer_bytes(bindings.indices).unwrap().len(), 12);
        assert_eq!(backend.buffer_kind(bindings.indices), Some(BufferKind::Index));
    }

    #[test]
    fn test_cursors_advance() {
        let mut backend = HeadlessBackend::new();
        let mut arena = small_arena(&mut backend);

        assert_eq!(arena.append_vertex(&mut backend, [1.0, 2.0, 3.0]).unwrap(), 0);
        assert_eq!(
            arena
                .append_vertices(&mut backend, &[[4.0, 5.0, 6.0], [7.0, 8.0, 9.0]])
                .unwrap(),
            1
        );
        assert_eq!(arena.vertex_cursor(), 3);
        assert_eq!(arena.normal_cursor(), 0);

        let stored = backend
            .read_vec3s(arena.bindings().positions, 0, 3)
            .unwrap();
        assert_eq!(stored, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
    }

    #[test]
    fn test_index_block_is_rebased() {
        let mut backend = HeadlessBackend::new();
        let mut arena = small_arena(&mut backend);

        let first = arena
            .append_index_block(&mut backend, &[0, 1, 2], 5)
            .unwrap();
        let second = arena
            .append_index_block(&mut backend, &[2, 1, 0], 0)
            .unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 3);
        assert_eq!(arena.index_cursor(), 6);
        assert_eq!(
            backend.read_u16s(arena.bindings().indices, 0, 6).unwrap(),
            vec![5, 6, 7, 2, 1, 0]
        );
    }

    #[test]
    fn test_capacity_exceeded_writes_nothing() {
        let mut backend = HeadlessBackend::new();
        let mut arena = small_arena(&mut backend);

        arena.append_normals(&mut backend, &[[0.0, 1.0, 0.0]; 6]).unwrap();
        let result = arena.append_normals(&mut backend, &[[1.0, 1.0, 1.0]; 3]);

        assert!(matches!(
            result,
            Err(ArenaError::CapacityExceeded {
                pool: PoolKind::Normals,
                requested: 3,
                used: 6,
                capacity: 8,
            })
        ));
        assert_eq!(arena.normal_cursor(), 6);
        let tail = backend.read_vec3s(arena.bindings().normals, 6, 2).unwrap();
        assert_eq!(tail, vec![[0.0; 3], [0.0; 3]]);
    }

    #[test]
    fn test_index_overflow() {
        let mut backend = HeadlessBackend::new();
        let mut arena = small_arena(&mut backend);

        let result = arena.append_index_block(&mut backend, &[0, 1, 2], 65_534);
        assert!(matches!(result, Err(ArenaError::IndexOverflow { index: 65_536 })));
        assert_eq!(arena.index_cursor(), 0);
    }

    #[test]
    fn test_room_check_rejects_unaddressable_vertices() {
        let mut backend = HeadlessBackend::new();
        let mut arena = GeometryArena::allocate(
            &mut backend,
            ArenaCapacity {
                vertices: 70_000,
                indices: 6,
            },
        )
        .unwrap();
        arena
            .append_vertices(&mut backend, &vec![[0.0; 3]; 65_530])
            .unwrap();

        assert!(arena.check_room(6, 3).is_ok());
        assert!(matches!(
            arena.check_room(7, 3),
            Err(ArenaError::IndexOverflow { index: 65_536 })
        ));
        // Unindexed meshes are only bound by pool capacity
        assert!(arena.check_room(7, 0).is_ok());
    }
}
