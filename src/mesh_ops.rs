//! Triangle mesh operations
//!
//! This module provides the geometric operations the quote is built on:
//! - Reference point (centroid) computation
//! - Signed and absolute volume computation
//! - Bounding box calculation

use crate::model::{Mesh, Triangle, Vertex};

/// Cubic millimeters per cubic centimeter
pub const MM3_PER_CM3: f64 = 1000.0;

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Vertex,
    /// Maximum corner
    pub max: Vertex,
}

impl BoundingBox {
    /// Width, height and depth along x, y and z
    pub fn size(&self) -> Vertex {
        self.max - self.min
    }

    /// Volume of the box in mm³
    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    fn include(&mut self, v: &Vertex) {
        self.min.x = self.min.x.min(v.x);
        self.min.y = self.min.y.min(v.y);
        self.min.z = self.min.z.min(v.z);
        self.max.x = self.max.x.max(v.x);
        self.max.y = self.max.y.max(v.y);
        self.max.z = self.max.z.max(v.z);
    }
}

/// Compute the bounding box of a set of vertices
///
/// Non-finite vertices are ignored. Returns `None` when no finite vertex exists.
pub fn compute_aabb<'a, I>(vertices: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Vertex>,
{
    let mut finite = vertices.into_iter().filter(|v| v.is_finite());
    let first = *finite.next()?;
    let mut aabb = BoundingBox {
        min: first,
        max: first,
    };
    for v in finite {
        aabb.include(v);
    }
    Some(aabb)
}

/// Compute the reference point used for volume summation
///
/// This is the arithmetic mean of every triangle corner (shared corners count
/// once per triangle). Non-finite corners are ignored so a single bad vertex
/// cannot poison the whole mesh. Returns `None` for a mesh with no finite
/// corner.
pub fn compute_reference_point(mesh: &Mesh) -> Option<Vertex> {
    let mut sum = Vertex::default();
    let mut count = 0usize;
    for v in mesh.vertices().filter(|v| v.is_finite()) {
        sum = sum + *v;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(sum.scaled(1.0 / count as f64))
}

/// Signed volume of the tetrahedron spanned by a triangle and a reference point
///
/// Equals `dot(p1, cross(p2, p3)) / 6` with each corner translated by the
/// reference point. The sign follows the triangle's winding.
pub fn signed_tetrahedron_volume(triangle: &Triangle, reference: Vertex) -> f64 {
    let [a, b, c] = triangle.vertices;
    let p1 = a - reference;
    let p2 = b - reference;
    let p3 = c - reference;
    p1.dot(&p2.cross(&p3)) / 6.0
}

/// Compute the signed volume of a mesh in mm³
///
/// Two passes: the reference point is computed first, then every triangle
/// contributes the signed volume of its tetrahedron with that point. Any
/// contribution that is not finite is discarded rather than aborting the sum.
///
/// For a closed mesh the result does not depend on the reference point;
/// using the centroid keeps the corner vectors short so that meshes centered
/// far from (or exactly at) the origin do not lose precision to cancellation.
///
/// # Arguments
/// * `mesh` - The mesh to compute volume for
///
/// # Returns
/// The signed volume; 0.0 for an empty mesh
pub fn compute_mesh_signed_volume(mesh: &Mesh) -> f64 {
    let Some(reference) = compute_reference_point(mesh) else {
        return 0.0;
    };

    mesh.triangles
        .iter()
        .map(|triangle| signed_tetrahedron_volume(triangle, reference))
        .filter(|contribution| contribution.is_finite())
        .sum()
}

/// Compute the enclosed volume of a mesh in cm³
///
/// Winding only affects the sign, so the absolute value is returned.
pub fn compute_mesh_volume_cm3(mesh: &Mesh) -> f64 {
    compute_mesh_signed_volume(mesh).abs() / MM3_PER_CM3
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned box as 12 outward-facing triangles
    fn box_mesh(min: Vertex, max: Vertex) -> Mesh {
        let v = [
            Vertex::new(min.x, min.y, min.z),
            Vertex::new(max.x, min.y, min.z),
            Vertex::new(max.x, max.y, min.z),
            Vertex::new(min.x, max.y, min.z),
            Vertex::new(min.x, min.y, max.z),
            Vertex::new(max.x, min.y, max.z),
            Vertex::new(max.x, max.y, max.z),
            Vertex::new(min.x, max.y, max.z),
        ];
        let faces = [
            [3, 2, 1],
            [1, 0, 3],
            [4, 5, 6],
            [6, 7, 4],
            [0, 1, 5],
            [5, 4, 0],
            [1, 2, 6],
            [6, 5, 1],
            [2, 3, 7],
            [7, 6, 2],
            [3, 0, 4],
            [4, 7, 3],
        ];
        faces
            .iter()
            .map(|f| Triangle::new(v[f[0]], v[f[1]], v[f[2]]))
            .collect()
    }

    #[test]
    fn test_cube_volume() {
        let mesh = box_mesh(Vertex::new(0.0, 0.0, 0.0), Vertex::new(10.0, 10.0, 10.0));
        let signed = compute_mesh_signed_volume(&mesh);
        assert!(signed > 0.0, "outward winding gives positive volume");
        assert!((signed - 1000.0).abs() < 1e-9);
        assert!((compute_mesh_volume_cm3(&mesh) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_box_centered_at_origin() {
        let mesh = box_mesh(Vertex::new(-5.0, -10.0, -15.0), Vertex::new(5.0, 10.0, 15.0));
        assert!((compute_mesh_signed_volume(&mesh) - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_far_from_origin_keeps_precision() {
        let offset = 1.0e7;
        let mesh = box_mesh(
            Vertex::new(offset, offset, offset),
            Vertex::new(offset + 10.0, offset + 10.0, offset + 10.0),
        );
        assert!((compute_mesh_volume_cm3(&mesh) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reversed_winding_same_absolute_volume() {
        let mesh = box_mesh(Vertex::new(0.0, 0.0, 0.0), Vertex::new(10.0, 20.0, 30.0));
        let reversed: Mesh = mesh.triangles.iter().map(Triangle::reversed).collect();
        let a = compute_mesh_signed_volume(&mesh);
        let b = compute_mesh_signed_volume(&reversed);
        assert!((a + b).abs() < 1e-9);
        assert!((compute_mesh_volume_cm3(&mesh) - compute_mesh_volume_cm3(&reversed)).abs() < 1e-12);
    }

    #[test]
    fn test_reference_point_is_centroid() {
        let mesh = box_mesh(Vertex::new(0.0, 0.0, 0.0), Vertex::new(2.0, 4.0, 6.0));
        let c = compute_reference_point(&mesh).unwrap();
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.y - 2.0).abs() < 1e-12);
        assert!((c.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_triangle_is_skipped() {
        let mut mesh = box_mesh(Vertex::new(0.0, 0.0, 0.0), Vertex::new(10.0, 10.0, 10.0));
        mesh.push(Triangle::new(
            Vertex::new(f64::NAN, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, f64::INFINITY, 0.0),
        ));
        assert!((compute_mesh_volume_cm3(&mesh) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        assert_eq!(compute_mesh_signed_volume(&mesh), 0.0);
        assert!(compute_reference_point(&mesh).is_none());
    }

    #[test]
    fn test_aabb() {
        let vertices = [
            Vertex::new(-5.0, -10.0, 0.0),
            Vertex::new(15.0, 5.0, 20.0),
            Vertex::new(3.0, 25.0, f64::NAN),
            Vertex::new(3.0, 25.0, 8.0),
        ];
        let aabb = compute_aabb(&vertices).unwrap();
        assert_eq!(aabb.min, Vertex::new(-5.0, -10.0, 0.0));
        assert_eq!(aabb.max, Vertex::new(15.0, 25.0, 20.0));
        assert_eq!(aabb.volume(), 20.0 * 35.0 * 20.0);
        assert!(compute_aabb(&[] as &[Vertex]).is_none());
    }
}
