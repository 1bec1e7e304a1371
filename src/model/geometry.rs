//! Geometry primitives: vertices, triangles and triangle soups

use std::ops::{Add, Sub};

/// A vertex in 3D space, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product, treating both vertices as vectors from the origin
    pub fn dot(&self, other: &Vertex) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product, treating both vertices as vectors from the origin
    pub fn cross(&self, other: &Vertex) -> Vertex {
        Vertex::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Scale all three coordinates by a factor
    pub fn scaled(&self, factor: f64) -> Vertex {
        Vertex::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Whether all three coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Sub for Vertex {
    type Output = Vertex;

    fn sub(self, rhs: Vertex) -> Vertex {
        Vertex::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Add for Vertex {
    type Output = Vertex;

    fn add(self, rhs: Vertex) -> Vertex {
        Vertex::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// A triangle made of three vertices, in source winding order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three corners as they appeared in the source file
    pub vertices: [Vertex; 3],
}

impl Triangle {
    /// Create a new triangle
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// The same triangle with opposite winding
    pub fn reversed(&self) -> Triangle {
        let [a, b, c] = self.vertices;
        Triangle::new(a, c, b)
    }

    /// Whether every corner has finite coordinates
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Vertex::is_finite)
    }
}

/// A triangle soup
///
/// The mesh is not required to be closed or manifold. Degenerate and
/// non-finite triangles are kept here and skipped during volume summation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Triangles in source order
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    /// Create a new mesh with pre-allocated capacity
    ///
    /// Binary STL declares its triangle count up front, so the parser can
    /// reserve space before reading records.
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Append a triangle
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Number of triangles
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Iterate over every triangle corner, three per triangle
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Append all triangles of another mesh
    pub fn extend(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }

    /// Translate every vertex by an offset
    pub fn translate(&mut self, offset: Vertex) {
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                *vertex = *vertex + offset;
            }
        }
    }
}

impl FromIterator<Triangle> for Mesh {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self {
            triangles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_of_axes() {
        let x = Vertex::new(1.0, 0.0, 0.0);
        let y = Vertex::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vertex::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vertex::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_dot_and_sub() {
        let a = Vertex::new(1.0, 2.0, 3.0);
        let b = Vertex::new(4.0, 5.0, 6.0);
        assert_eq!(a.dot(&b), 32.0);
        assert_eq!(b - a, Vertex::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_reversed_swaps_winding() {
        let t = Triangle::new(
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        );
        let r = t.reversed();
        assert_eq!(r.vertices[0], t.vertices[0]);
        assert_eq!(r.vertices[1], t.vertices[2]);
        assert_eq!(r.vertices[2], t.vertices[1]);
    }

    #[test]
    fn test_non_finite_triangle() {
        let t = Triangle::new(
            Vertex::new(f64::NAN, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        );
        assert!(!t.is_finite());
    }

    #[test]
    fn test_mesh_translate() {
        let mut mesh: Mesh = std::iter::once(Triangle::new(
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        ))
        .collect();
        mesh.translate(Vertex::new(10.0, 0.0, -1.0));
        assert_eq!(mesh.triangles[0].vertices[1], Vertex::new(11.0, 0.0, -1.0));
        assert_eq!(mesh.vertices().count(), 3);
    }
}
