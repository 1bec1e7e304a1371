//! STL decoding, binary and ASCII

use crate::error::{Error, Result};
use crate::model::{Mesh, Triangle, Vertex};
use tracing::debug;

use super::STL_HEADER_LEN;

/// Bytes per binary triangle record: normal, three vertices, attribute
pub(super) const TRIANGLE_RECORD_LEN: usize = 50;

/// Offset of the first vertex within a triangle record (after the normal)
const RECORD_VERTEX_OFFSET: usize = 12;

/// Whether an STL buffer should be decoded as binary
///
/// Looks at byte 80, the first byte of the binary triangle count. Binary is
/// assumed when it is outside printable ASCII `[32, 126]`. This can misfire
/// on crafted input (e.g. a binary file declaring 65 triangles reads as
/// ASCII `A`) and is kept as-is for compatibility.
///
/// Buffers shorter than 84 bytes are never binary.
pub fn is_binary_stl(data: &[u8]) -> bool {
    match data.get(80) {
        Some(&byte) => data.len() >= STL_HEADER_LEN && !(32..=126).contains(&byte),
        None => false,
    }
}

/// Parse an STL file
///
/// Returns the triangles that could be decoded. Zero triangles is not an
/// error at this level.
///
/// # Errors
///
/// `InvalidFormat` when the buffer is shorter than the 84-byte header.
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    if data.len() < STL_HEADER_LEN {
        return Err(Error::invalid_format_context("STL", "too short"));
    }

    if is_binary_stl(data) {
        Ok(parse_binary_stl(data))
    } else {
        Ok(parse_ascii_stl(data))
    }
}

fn read_f32_le(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_vertex(data: &[u8], offset: usize) -> Vertex {
    Vertex::new(
        read_f32_le(data, offset) as f64,
        read_f32_le(data, offset + 4) as f64,
        read_f32_le(data, offset + 8) as f64,
    )
}

/// Decode binary records until the declared count or the buffer runs out
fn parse_binary_stl(data: &[u8]) -> Mesh {
    let declared = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let available = (data.len() - STL_HEADER_LEN) / TRIANGLE_RECORD_LEN;

    // Never trust the declared count for allocation
    let mut mesh = Mesh::with_capacity(declared.min(available));

    for i in 0..declared {
        let offset = STL_HEADER_LEN + i * TRIANGLE_RECORD_LEN;
        if offset + TRIANGLE_RECORD_LEN > data.len() {
            break;
        }

        let v = offset + RECORD_VERTEX_OFFSET;
        mesh.push(Triangle::new(
            read_vertex(data, v),
            read_vertex(data, v + 12),
            read_vertex(data, v + 24),
        ));
    }

    debug!(
        "Binary STL declares {} triangles, decoded {}",
        declared,
        mesh.len()
    );

    mesh
}

/// Parse the three coordinates of a `vertex x y z` line
fn parse_vertex_line(line: &str) -> Option<Vertex> {
    let mut fields = line.split_whitespace().skip(1);
    let x = fields.next()?.parse::<f64>().ok()?;
    let y = fields.next()?.parse::<f64>().ok()?;
    let z = fields.next()?.parse::<f64>().ok()?;
    Some(Vertex::new(x, y, z))
}

/// Decode an ASCII STL line by line
///
/// Every three consecutive `vertex` lines close a triangle. `endfacet` and
/// `endsolid` drop any partially collected triangle.
fn parse_ascii_stl(data: &[u8]) -> Mesh {
    let text = String::from_utf8_lossy(data);
    let mut mesh = Mesh::new();
    let mut pending: Vec<Vertex> = Vec::with_capacity(3);
    let mut skipped_lines = 0usize;

    for line in text.lines() {
        let line = line.trim();

        if line.starts_with("vertex") {
            match parse_vertex_line(line) {
                Some(vertex) => pending.push(vertex),
                None => {
                    skipped_lines += 1;
                    pending.clear();
                    continue;
                }
            }

            if pending.len() == 3 {
                mesh.push(Triangle::new(pending[0], pending[1], pending[2]));
                pending.clear();
            }
        } else if line.starts_with("endfacet") || line.starts_with("endsolid") {
            pending.clear();
        }
    }

    debug!(
        "ASCII STL decoded {} triangles ({} malformed vertex lines)",
        mesh.len(),
        skipped_lines
    );

    mesh
}
