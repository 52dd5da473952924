//! # Primitive Shape Generation
//!
//! Generators for the three primitive families. All shapes live in a unit
//! volume around the origin and are scaled into the world by the object
//! transform.

use super::GeometryData;
use cgmath::{InnerSpace, Vector3};
use std::f32::consts::TAU;

/// The 20 faces of the base icosahedron, wound counter-clockwise
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    // around vertex 0
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    // adjacent
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    // around vertex 3
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    // adjacent
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Point set on the unit sphere with exact-match deduplication
struct SpherePoints {
    points: Vec<Vector3<f32>>,
}

impl SpherePoints {
    fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Projects `p` onto the unit sphere and returns its index, reusing an
    /// existing point only when all three coordinates compare equal.
    ///
    /// Linear scan: quadratic in the number of points per subdivision round.
    fn insert(&mut self, p: Vector3<f32>) -> u32 {
        let p = p.normalize();
        if let Some(existing) = self.points.iter().position(|q| *q == p) {
            return existing as u32;
        }
        self.points.push(p);
        (self.points.len() - 1) as u32
    }

    fn midpoint(&mut self, a: u32, b: u32) -> u32 {
        let mid = (self.points[a as usize] + self.points[b as usize]) * 0.5;
        self.insert(mid)
    }
}

/// Generate a unit icosphere by subdividing an icosahedron `recurse` times
///
/// The result is indexed: every vertex is shared by the faces around it and
/// its normal is its own (unit length) position. For `recurse = k` the mesh has
/// `2 + 10·4^k` vertices and `20·4^k` faces.
pub fn icosphere(recurse: u32) -> GeometryData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let mut sphere = SpherePoints::new();
    for p in [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ] {
        sphere.insert(Vector3::from(p));
    }

    let mut faces = ICOSAHEDRON_FACES.to_vec();
    for _ in 0..recurse {
        let mut refined = Vec::with_capacity(faces.len() * 4);
        for [v0, v1, v2] in faces {
            let a = sphere.midpoint(v0, v1);
            let b = sphere.midpoint(v1, v2);
            let c = sphere.midpoint(v2, v0);

            refined.push([v0, a, c]);
            refined.push([v1, b, a]);
            refined.push([v2, c, b]);
            refined.push([a, b, c]);
        }
        faces = refined;
    }

    let mut data = GeometryData::new();
    for p in &sphere.points {
        data.vertices.push((*p).into());
        data.normals.push(p.normalize().into());
    }
    data.indices = faces.into_iter().flatten().collect();
    data
}

/// Number of circle segments for an angular step, `ceil(360 / angle)`
///
/// Non-positive or non-finite steps yield a single segment.
pub fn segment_count(angle_deg: f32) -> u32 {
    if !(angle_deg > 0.0) || !angle_deg.is_finite() {
        return 1;
    }
    (360.0 / angle_deg).ceil() as u32
}

/// Appends one flat-shaded triangle; all three vertices get the normalized
/// cross product of its edges `(p2 - p0) x (p1 - p0)`.
fn push_flat_triangle(data: &mut GeometryData, p0: Vector3<f32>, p1: Vector3<f32>, p2: Vector3<f32>) {
    let normal: [f32; 3] = (p2 - p0).cross(p1 - p0).normalize().into();
    for p in [p0, p1, p2] {
        data.vertices.push(p.into());
        data.normals.push(normal);
    }
}

fn circle_point(segment: u32, segments: u32, y: f32) -> Vector3<f32> {
    let alpha = segment as f32 * TAU / segments as f32;
    Vector3::new(alpha.cos(), y, alpha.sin())
}

/// Generate a flat-shaded cone with the given angular step in degrees
///
/// Base circle of radius 1 in the `y = -1` plane, apex at `(0, 1, 0)`.
/// Emits two triangles per segment (base fan and side) with no shared vertices.
pub fn cone(angle_deg: f32) -> GeometryData {
    let segments = segment_count(angle_deg);
    let base_center = Vector3::new(0.0, -1.0, 0.0);
    let apex = Vector3::new(0.0, 1.0, 0.0);

    let mut data = GeometryData::new();
    let mut p1 = Vector3::new(1.0, -1.0, 0.0);
    for i in 1..=segments {
        let p2 = circle_point(i, segments, -1.0);
        push_flat_triangle(&mut data, base_center, p2, p1);
        push_flat_triangle(&mut data, apex, p1, p2);
        p1 = p2;
    }
    data
}

/// Generate a flat-shaded cylinder with the given angular step in degrees
///
/// Circles of radius 1 in the `y = -1` and `y = 1` planes. Emits four
/// triangles per segment: bottom fan, top fan and the two halves of the side quad.
pub fn cylinder(angle_deg: f32) -> GeometryData {
    let segments = segment_count(angle_deg);
    let bottom_center = Vector3::new(0.0, -1.0, 0.0);
    let top_center = Vector3::new(0.0, 1.0, 0.0);

    let mut data = GeometryData::new();
    let mut p1_bottom = Vector3::new(1.0, -1.0, 0.0);
    let mut p1_top = Vector3::new(1.0, 1.0, 0.0);
    for i in 1..=segments {
        let p2_bottom = circle_point(i, segments, -1.0);
        let p2_top = circle_point(i, segments, 1.0);

        push_flat_triangle(&mut data, bottom_center, p2_bottom, p1_bottom);
        push_flat_triangle(&mut data, top_center, p1_top, p2_top);
        push_flat_triangle(&mut data, p1_bottom, p2_bottom, p1_top);
        push_flat_triangle(&mut data, p1_top, p2_bottom, p2_top);

        p1_bottom = p2_bottom;
        p1_top = p2_top;
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_flat_shaded(data: &GeometryData) {
        assert_eq!(data.vertices.len() % 3, 0);
        assert_eq!(data.vertices.len(), data.normals.len());

        for (tri, normals) in data.vertices.chunks(3).zip(data.normals.chunks(3)) {
            let p0 = Vector3::from(tri[0]);
            let p1 = Vector3::from(tri[1]);
            let p2 = Vector3::from(tri[2]);
            let expected: [f32; 3] = (p2 - p0).cross(p1 - p0).normalize().into();

            assert_eq!(normals[0], normals[1]);
            assert_eq!(normals[1], normals[2]);
            assert_eq!(normals[0], expected);
        }
    }

    #[test]
    fn test_icosphere_counts() {
        for k in 0..=4u32 {
            let sphere = icosphere(k);
            let scale = 4usize.pow(k);
            assert_eq!(sphere.vertex_count(), 2 + 10 * scale, "recurse = {}", k);
            assert_eq!(sphere.triangle_count(), 20 * scale, "recurse = {}", k);
            assert_eq!(sphere.normals.len(), sphere.vertices.len());
        }
    }

    #[test]
    fn test_icosphere_vertices_on_unit_sphere() {
        for k in 0..=4u32 {
            let sphere = icosphere(k);
            for v in &sphere.vertices {
                let norm = Vector3::from(*v).magnitude();
                assert!((norm - 1.0).abs() <= 1e-6, "norm {} at recurse {}", norm, k);
            }
        }
    }

    #[test]
    fn test_icosphere_indices_in_range() {
        let sphere = icosphere(3);
        let count = sphere.vertex_count() as u32;
        assert!(sphere.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(90.0), 4);
        assert_eq!(segment_count(3.0), 120);
        assert_eq!(segment_count(7.0), 52);
        assert_eq!(segment_count(360.0), 1);
        assert_eq!(segment_count(0.0), 1);
    }

    #[test]
    fn test_cone_generation() {
        for angle in [90.0, 20.0, 7.0, 3.0] {
            let cone = cone(angle);
            let segments = segment_count(angle) as usize;
            assert_eq!(cone.triangle_count(), 2 * segments);
            assert_eq!(cone.vertex_count(), 6 * segments);
            assert!(!cone.is_indexed());
            assert_flat_shaded(&cone);
        }
    }

    #[test]
    fn test_cylinder_generation() {
        for angle in [90.0, 20.0, 7.0, 3.0] {
            let cylinder = cylinder(angle);
            let segments = segment_count(angle) as usize;
            assert_eq!(cylinder.triangle_count(), 4 * segments);
            assert_eq!(cylinder.vertex_count(), 12 * segments);
            assert!(!cylinder.is_indexed());
            assert_flat_shaded(&cylinder);
        }
    }

    #[test]
    fn test_cylinder_stays_in_unit_volume() {
        let cylinder = cylinder(20.0);
        for v in &cylinder.vertices {
            assert!(v[1] == -1.0 || v[1] == 1.0);
            assert!(v[0] * v[0] + v[2] * v[2] <= 1.0 + 1e-5);
        }
    }
}
