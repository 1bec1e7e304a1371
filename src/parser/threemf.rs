//! 3MF decoding
//!
//! A 3MF file is a ZIP archive holding an XML model part. Only the mesh
//! geometry is read: vertices, triangles and the model unit. Build items,
//! components, materials and extensions are ignored.
//!
//! Mesh lookup is namespace tolerant. Element names are tried unqualified
//! first, then with the prefix of the document's declared namespace, and
//! finally by local name alone. When the model part yields no mesh, the
//! meshes of the archive's other model parts are merged instead, and failing
//! that the archive is searched for an embedded STL or OBJ file.

use super::{Geometry, MeshFormat, looks_like_obj, looks_like_stl, parse_obj, parse_stl};
use crate::config::{self, DEFAULT_UNIT};
use crate::error::{Error, Result};
use crate::model::{Mesh, Triangle, Vertex};
use crate::opc::{MODEL_EXTENSION, Package};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use std::io::{Cursor, Read, Seek};
use tracing::debug;

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// Path fragment shared by every version of the 3MF core namespace
const CORE_NAMESPACE_MARKER: &str = "/3dmanufacturing/core/";

/// Archive entries that never hold geometry
const NON_GEOMETRY_EXTENSIONS: [&str; 7] = [
    MODEL_EXTENSION,
    ".rels",
    ".xml",
    ".png",
    ".jpg",
    ".jpeg",
    ".config",
];

/// Parse a 3MF archive
///
/// # Errors
///
/// `Zip` when the buffer is not a readable archive, and `NoMeshData` when
/// neither a model part nor any embedded file yields triangles.
pub fn parse_3mf(data: &[u8]) -> Result<Geometry> {
    let mut package = Package::open(Cursor::new(data))?;

    let model_error = match package.find_model_part() {
        Some(part) => {
            let xml = package.get_file(&part)?;
            match parse_model_xml(&xml) {
                Ok(mesh) => return Ok(Geometry::Mesh(mesh)),
                Err(e) => {
                    debug!("Model part '{}' yielded no mesh: {}", part, e);
                    if let Some(mesh) = parse_other_model_parts(&mut package, &part) {
                        return Ok(Geometry::Mesh(mesh));
                    }
                    e
                }
            }
        }
        None => {
            if let Some(name) = package.find_by_extension(&[".stl", ".obj"]) {
                debug!("No model part, delegating to embedded '{}'", name);
                let bytes = package.get_file_binary(&name)?;
                let format = MeshFormat::from_filename(&name).unwrap_or(MeshFormat::Stl);
                return super::parse_with_format(format, &bytes);
            }
            Error::NoMeshData("archive contains no .model, .stl or .obj entry".to_string())
        }
    };

    match parse_best_guess_entry(&mut package)? {
        Some(geometry) => Ok(geometry),
        None => Err(model_error),
    }
}

/// Merge the meshes of every model part except `skip`
///
/// Production exports keep object meshes in their own parts, typically under
/// `3D/Objects/`, and the root part only references them as components.
/// Parts that cannot be read or hold no mesh are skipped.
fn parse_other_model_parts<R: Read + Seek>(
    package: &mut Package<R>,
    skip: &str,
) -> Option<Mesh> {
    let parts: Vec<String> = package
        .file_names()
        .into_iter()
        .filter(|name| name != skip && name.to_ascii_lowercase().ends_with(MODEL_EXTENSION))
        .collect();

    let mut merged = Mesh::new();
    for part in parts {
        let mesh = package
            .get_file(&part)
            .and_then(|xml| parse_model_xml(&xml));
        match mesh {
            Ok(mesh) => {
                debug!("Model part '{}' holds {} triangles", part, mesh.len());
                merged.extend(mesh);
            }
            Err(e) => debug!("Model part '{}' yielded no mesh: {}", part, e),
        }
    }

    (!merged.is_empty()).then_some(merged)
}

/// Content-sniff the largest entry that could hold geometry
fn parse_best_guess_entry<R: Read + Seek>(package: &mut Package<R>) -> Result<Option<Geometry>> {
    let candidates: Vec<String> = package
        .file_names()
        .into_iter()
        .filter(|name| !name.ends_with('/'))
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            !NON_GEOMETRY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        })
        .collect();

    let mut best: Option<(String, u64)> = None;
    for name in candidates {
        let size = package.file_size(&name).unwrap_or(0);
        if best.as_ref().is_none_or(|(_, best_size)| size > *best_size) {
            best = Some((name, size));
        }
    }

    let Some((name, _)) = best else {
        return Ok(None);
    };

    let bytes = package.get_file_binary(&name)?;
    let geometry = if looks_like_stl(&bytes) {
        debug!("Embedded entry '{}' sniffed as STL", name);
        match parse_stl(&bytes) {
            Ok(mesh) if !mesh.is_empty() => Some(Geometry::Mesh(mesh)),
            _ => None,
        }
    } else if looks_like_obj(&bytes) {
        debug!("Embedded entry '{}' sniffed as OBJ", name);
        parse_obj(&bytes).ok()
    } else {
        None
    };

    Ok(geometry)
}

/// How element names are compared while searching for mesh data
#[derive(Debug, Clone, PartialEq, Eq)]
enum TagMatch {
    /// Name without any prefix
    Unqualified,
    /// Name with the given namespace prefix
    Prefixed(String),
    /// Any prefix, compare the local name only
    LocalName,
}

impl TagMatch {
    fn matches(&self, name: QName<'_>, local: &[u8]) -> bool {
        match self {
            TagMatch::Unqualified => name.as_ref() == local,
            TagMatch::Prefixed(prefix) => {
                name.prefix()
                    .is_some_and(|p| p.as_ref() == prefix.as_bytes())
                    && name.local_name().as_ref() == local
            }
            TagMatch::LocalName => name.local_name().as_ref() == local,
        }
    }
}

/// Attributes of the root `<model>` element that drive mesh extraction
#[derive(Debug, Clone, PartialEq)]
struct ModelRoot {
    unit: String,
    namespace_prefix: Option<String>,
}

/// Extract every mesh of a 3MF model part, in millimeters
///
/// Note: This function is public to enable integration testing of the XML
/// layer without building an archive.
#[doc(hidden)]
pub fn parse_model_xml(xml: &str) -> Result<Mesh> {
    let root = read_model_root(xml)?;
    let factor = config::unit_factor(&root.unit);
    debug!("3MF unit '{}' (x{} to mm)", root.unit, factor);

    let mut strategies = vec![TagMatch::Unqualified];
    if let Some(prefix) = root.namespace_prefix {
        strategies.push(TagMatch::Prefixed(prefix));
    }
    strategies.push(TagMatch::LocalName);

    for strategy in &strategies {
        let mesh = collect_meshes(xml, strategy, factor)?;
        if !mesh.is_empty() {
            debug!("Found {} triangles using {:?} lookup", mesh.len(), strategy);
            return Ok(mesh);
        }
    }

    Err(Error::NoMeshData(
        "model part contains no <mesh> with triangles".to_string(),
    ))
}

fn reader_for(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

/// Read the unit and namespace prefix from the root element
fn read_model_root(xml: &str) -> Result<ModelRoot> {
    let mut reader = reader_for(xml);
    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::DocType(_) => {
                // DTD declarations are not allowed (entity expansion)
                return Err(Error::invalid_format_context(
                    "3MF",
                    "DTD declarations are not allowed in model parts",
                ));
            }
            Event::Start(ref e) | Event::Empty(ref e) => return parse_root_element(e),
            Event::Eof => {
                return Err(Error::NoMeshData("model part is empty".to_string()));
            }
            _ => {}
        }
        buf.clear();
    }
}

fn parse_root_element(e: &BytesStart<'_>) -> Result<ModelRoot> {
    let root_prefix = e
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

    let mut unit = DEFAULT_UNIT.to_string();
    let mut default_namespace = None;
    let mut declared: Vec<(String, String)> = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();

        if key == "unit" {
            unit = value.trim().to_ascii_lowercase();
        } else if key == "xmlns" {
            default_namespace = Some(value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push((prefix.to_string(), value));
        }
    }

    // The root's own prefix wins; otherwise use whichever prefix is bound to
    // the document namespace or to the 3MF core namespace
    let namespace_prefix = root_prefix.or_else(|| {
        declared
            .iter()
            .find(|(_, uri)| {
                Some(uri) == default_namespace.as_ref() || uri.contains(CORE_NAMESPACE_MARKER)
            })
            .map(|(prefix, _)| prefix.clone())
    });

    Ok(ModelRoot {
        unit,
        namespace_prefix,
    })
}

/// Collect the triangles of every `<mesh>` that matches the strategy
///
/// Triangle indices refer to the vertex list of their own mesh. Triangles
/// whose indices are missing or out of range are skipped.
fn collect_meshes(xml: &str, tags: &TagMatch, factor: f64) -> Result<Mesh> {
    let mut reader = reader_for(xml);
    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);

    let mut mesh = Mesh::new();
    let mut in_mesh = false;
    let mut in_vertices = false;
    let mut in_triangles = false;
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<[usize; 3]> = Vec::new();
    let mut skipped = 0usize;

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf)?;
        let is_empty_element = matches!(event, Event::Empty(_));

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                if tags.matches(name, b"mesh") {
                    if !is_empty_element {
                        in_mesh = true;
                        vertices.clear();
                        indices.clear();
                    }
                } else if in_mesh && tags.matches(name, b"vertices") {
                    in_vertices = !is_empty_element;
                } else if in_mesh && tags.matches(name, b"triangles") {
                    in_triangles = !is_empty_element;
                } else if in_vertices && tags.matches(name, b"vertex") {
                    vertices.push(parse_vertex(e)?.scaled(factor));
                } else if in_triangles && tags.matches(name, b"triangle") {
                    match parse_triangle(e)? {
                        Some(triangle) => indices.push(triangle),
                        None => skipped += 1,
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                if tags.matches(name, b"vertices") {
                    in_vertices = false;
                } else if tags.matches(name, b"triangles") {
                    in_triangles = false;
                } else if in_mesh && tags.matches(name, b"mesh") {
                    skipped += resolve_triangles(&vertices, &indices, &mut mesh);
                    in_mesh = false;
                    in_vertices = false;
                    in_triangles = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if skipped > 0 {
        debug!("Skipped {} unusable 3MF triangles", skipped);
    }

    Ok(mesh)
}

/// Turn index triples into triangles, returning how many were out of range
fn resolve_triangles(vertices: &[Vertex], indices: &[[usize; 3]], mesh: &mut Mesh) -> usize {
    let mut skipped = 0;
    for &[v1, v2, v3] in indices {
        match (vertices.get(v1), vertices.get(v2), vertices.get(v3)) {
            (Some(a), Some(b), Some(c)) => mesh.push(Triangle::new(*a, *b, *c)),
            _ => skipped += 1,
        }
    }
    skipped
}

/// Parse a `<vertex x y z/>` element
///
/// A missing or malformed coordinate becomes NaN, which keeps the vertex
/// numbering intact; the volume sum skips triangles touching it.
fn parse_vertex(e: &BytesStart<'_>) -> Result<Vertex> {
    let mut coords = [f64::NAN; 3];

    for attr in e.attributes() {
        let attr = attr?;
        let slot = match attr.key.local_name().as_ref() {
            b"x" => 0,
            b"y" => 1,
            b"z" => 2,
            _ => continue,
        };
        coords[slot] = std::str::from_utf8(&attr.value)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);
    }

    Ok(Vertex::new(coords[0], coords[1], coords[2]))
}

/// Parse a `<triangle v1 v2 v3/>` element, `None` if an index is unusable
fn parse_triangle(e: &BytesStart<'_>) -> Result<Option<[usize; 3]>> {
    let mut slots: [Option<usize>; 3] = [None; 3];

    for attr in e.attributes() {
        let attr = attr?;
        let slot = match attr.key.local_name().as_ref() {
            b"v1" => 0,
            b"v2" => 1,
            b"v3" => 2,
            _ => continue,
        };
        slots[slot] = std::str::from_utf8(&attr.value)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok());
    }

    Ok(match slots {
        [Some(v1), Some(v2), Some(v3)] => Some([v1, v2, v3]),
        _ => None,
    })
}
