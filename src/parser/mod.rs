//! Model file decoding
//!
//! Three independent decoders turn raw file bytes into a common
//! triangle-soup [`Mesh`]. The decoder is chosen by file extension only;
//! content is never inspected to guess the format, except inside the 3MF
//! decoder's nested-file fallback.

mod obj;
mod stl;
mod threemf;

use crate::error::{Error, Result};
use crate::mesh_ops::{self, BoundingBox, MM3_PER_CM3};
use crate::model::Mesh;
use std::path::Path;
use tracing::{debug, info};

// Re-export public functions to maintain a flat API
pub use obj::parse_obj;
pub use stl::{is_binary_stl, parse_stl};
pub use threemf::{parse_3mf, parse_model_xml};

/// Smallest buffer that can hold an STL header and triangle count
pub const STL_HEADER_LEN: usize = 84;

/// Fill factor applied to the bounding box of a face-less OBJ point cloud
pub const POINT_CLOUD_FILL_FACTOR: f64 = 0.6;

/// Supported model file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Binary or ASCII STL
    Stl,
    /// Wavefront OBJ
    Obj,
    /// 3D Manufacturing Format
    ThreeMf,
}

impl MeshFormat {
    /// Detect format from a file name's extension, case-insensitively
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                "obj" => Some(MeshFormat::Obj),
                "3mf" => Some(MeshFormat::ThreeMf),
                _ => None,
            })
    }

    /// Lower-case extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "stl",
            MeshFormat::Obj => "obj",
            MeshFormat::ThreeMf => "3mf",
        }
    }
}

/// Geometry extracted from a model file
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A triangle soup
    Mesh(Mesh),
    /// Vertices without faces; only their extent is known
    PointCloud(BoundingBox),
}

impl Geometry {
    /// Enclosed volume in cm³
    ///
    /// A point cloud is approximated as its bounding box scaled by
    /// [`POINT_CLOUD_FILL_FACTOR`].
    pub fn volume_cm3(&self) -> f64 {
        match self {
            Geometry::Mesh(mesh) => mesh_ops::compute_mesh_volume_cm3(mesh),
            Geometry::PointCloud(aabb) => aabb.volume() * POINT_CLOUD_FILL_FACTOR / MM3_PER_CM3,
        }
    }

    /// Number of triangles, zero for a point cloud
    pub fn triangle_count(&self) -> usize {
        match self {
            Geometry::Mesh(mesh) => mesh.len(),
            Geometry::PointCloud(_) => 0,
        }
    }

    /// The mesh, if this geometry has faces
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Geometry::Mesh(mesh) => Some(mesh),
            Geometry::PointCloud(_) => None,
        }
    }
}

/// Parse a model file, choosing the decoder from the file name
///
/// # Arguments
///
/// * `filename` - Declared file name; only its extension is used
/// * `data` - Complete file contents
///
/// # Errors
///
/// `UnsupportedFormat` for any extension other than stl, obj or 3mf, and
/// whatever error the selected decoder reports.
pub fn parse_model(filename: &str, data: &[u8]) -> Result<Geometry> {
    let format =
        MeshFormat::from_filename(filename).ok_or_else(|| Error::unsupported_extension(filename))?;

    info!(
        "Parsing {} ({} bytes, format: {:?})",
        filename,
        data.len(),
        format
    );

    parse_with_format(format, data)
}

/// Parse bytes with an already chosen decoder
pub fn parse_with_format(format: MeshFormat, data: &[u8]) -> Result<Geometry> {
    let geometry = match format {
        MeshFormat::Stl => Geometry::Mesh(parse_stl(data)?),
        MeshFormat::Obj => parse_obj(data)?,
        MeshFormat::ThreeMf => parse_3mf(data)?,
    };

    debug!(
        "Decoded {:?}: {} triangles",
        format,
        geometry.triangle_count()
    );

    Ok(geometry)
}

/// Whether bytes found inside an archive look like an STL file
///
/// ASCII STL starts with `solid` and contains `facet`; binary STL is
/// recognized when its declared triangle count fits the buffer exactly.
pub fn looks_like_stl(data: &[u8]) -> bool {
    let head = &data[..data.len().min(512)];
    let text = String::from_utf8_lossy(head);
    if text.trim_start().starts_with("solid") && text.contains("facet") {
        return true;
    }

    if data.len() < STL_HEADER_LEN {
        return false;
    }
    let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    count > 0 && STL_HEADER_LEN + count * stl::TRIANGLE_RECORD_LEN == data.len()
}

/// Whether bytes found inside an archive look like an OBJ file
///
/// True when any line is a vertex record (`v x y z`).
pub fn looks_like_obj(data: &[u8]) -> bool {
    String::from_utf8_lossy(data)
        .lines()
        .any(|line| line.trim_start().starts_with("v "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_filename("part.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_filename("PART.STL"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_filename("a.b.obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_filename("x.3MF"), Some(MeshFormat::ThreeMf));
        assert_eq!(MeshFormat::from_filename("part.step"), None);
        assert_eq!(MeshFormat::from_filename("stl"), None);
        assert_eq!(MeshFormat::from_filename(""), None);
    }

    #[test]
    fn test_unsupported_extension_is_error() {
        let err = parse_model("drawing.dxf", b"anything").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_looks_like_stl() {
        assert!(looks_like_stl(b"solid part\n facet normal 0 0 1\n"));
        assert!(!looks_like_stl(b"v 0 0 0\nv 1 0 0\n"));

        let mut binary = vec![0u8; STL_HEADER_LEN + 50];
        binary[80..84].copy_from_slice(&1u32.to_le_bytes());
        assert!(looks_like_stl(&binary));
        binary.push(0);
        assert!(!looks_like_stl(&binary));
    }

    #[test]
    fn test_looks_like_obj() {
        assert!(looks_like_obj(b"# comment\nv 0 0 0\nf 1 2 3\n"));
        assert!(!looks_like_obj(b"vt 0 0\nvn 0 0 1\n"));
        assert!(!looks_like_obj(b"solid x\nendsolid x\n"));
    }

    #[test]
    fn test_point_cloud_volume() {
        let aabb = BoundingBox {
            min: crate::model::Vertex::new(0.0, 0.0, 0.0),
            max: crate::model::Vertex::new(10.0, 10.0, 10.0),
        };
        let geometry = Geometry::PointCloud(aabb);
        assert!((geometry.volume_cm3() - 0.6).abs() < 1e-12);
        assert_eq!(geometry.triangle_count(), 0);
        assert!(geometry.as_mesh().is_none());
    }
}
