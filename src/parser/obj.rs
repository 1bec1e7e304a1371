//! Wavefront OBJ decoding

use super::Geometry;
use crate::error::{Error, Result};
use crate::mesh_ops;
use crate::model::{Mesh, Triangle, Vertex};
use tracing::debug;

/// Parse an OBJ file
///
/// Vertices come from `v` records and faces from `f` records. Faces may
/// appear before the vertices they reference. Polygonal faces are
/// fan-triangulated from their first corner. A file with vertices but no
/// usable faces yields a [`Geometry::PointCloud`].
///
/// # Errors
///
/// `NoGeometryData` when the file contains no vertex records.
pub fn parse_obj(data: &[u8]) -> Result<Geometry> {
    let text = String::from_utf8_lossy(data);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut raw_faces: Vec<Vec<i64>> = Vec::new();

    for line in text.lines() {
        let line = line.trim_start();

        if let Some(rest) = line.strip_prefix("v ") {
            vertices.push(parse_vertex(rest));
        } else if let Some(rest) = line.strip_prefix("f ") {
            let face = parse_face(rest, vertices.len());
            if face.len() >= 3 {
                raw_faces.push(face);
            }
        }
    }

    if vertices.is_empty() {
        return Err(Error::NoGeometryData(
            "OBJ file contains no vertex records".to_string(),
        ));
    }

    let faces: Vec<Vec<usize>> = raw_faces
        .iter()
        .map(|face| resolve_face(face, vertices.len()))
        .filter(|face| face.len() >= 3)
        .collect();

    if faces.is_empty() {
        debug!(
            "OBJ has {} vertices and no faces, using bounding box",
            vertices.len()
        );
        let aabb = mesh_ops::compute_aabb(&vertices).ok_or_else(|| {
            Error::NoGeometryData("OBJ vertices have no finite coordinates".to_string())
        })?;
        return Ok(Geometry::PointCloud(aabb));
    }

    let mut mesh = Mesh::new();
    for face in &faces {
        fan_triangulate(face, &vertices, &mut mesh);
    }

    debug!(
        "OBJ decoded {} vertices, {} faces, {} triangles",
        vertices.len(),
        faces.len(),
        mesh.len()
    );

    Ok(Geometry::Mesh(mesh))
}

/// Parse the coordinates of a `v` record
///
/// Missing or malformed coordinates become NaN so that vertex numbering stays
/// aligned with the file; such vertices are skipped later by the volume sum.
fn parse_vertex(rest: &str) -> Vertex {
    let mut coords = rest
        .split_whitespace()
        .map(|s| s.parse::<f64>().unwrap_or(f64::NAN));
    let mut next = || coords.next().unwrap_or(f64::NAN);
    Vertex::new(next(), next(), next())
}

/// Read the vertex indices of an `f` record as 0-based positions
///
/// Each token's leading integer (before any `/`) is a 1-based index, or a
/// negative index relative to the vertices read so far. Positions are not
/// range checked here since later `v` records may still supply them.
fn parse_face(rest: &str, vertices_so_far: usize) -> Vec<i64> {
    let count = i64::try_from(vertices_so_far).unwrap_or(i64::MAX);
    rest.split_whitespace()
        .filter_map(|token| token.split('/').next())
        .filter_map(|index| index.parse::<i64>().ok())
        .filter_map(|index| match index {
            i if i > 0 => Some(i - 1),
            i if i < 0 => Some(count + i),
            _ => None,
        })
        .collect()
}

/// Keep the positions that name an existing vertex
fn resolve_face(face: &[i64], vertex_count: usize) -> Vec<usize> {
    face.iter()
        .filter_map(|&position| usize::try_from(position).ok())
        .filter(|&position| position < vertex_count)
        .collect()
}

/// Emit `(v0, vi, vi+1)` for every consecutive pair after the first corner
fn fan_triangulate(face: &[usize], vertices: &[Vertex], mesh: &mut Mesh) {
    let v0 = vertices[face[0]];
    for pair in face[1..].windows(2) {
        mesh.push(Triangle::new(v0, vertices[pair[0]], vertices[pair[1]]));
    }
}
