//! Shared fixtures for integration tests
//!
//! Model files are generated in memory: STL and OBJ as bytes, 3MF as a ZIP
//! archive written with `zip::ZipWriter`.

#![allow(dead_code)]

use printquote::{Mesh, Triangle, Vertex};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Outward-facing quads of a unit cube, as corner indices
const CUBE_QUADS: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// Corners of an axis-aligned cube
pub fn cube_corners(edge: f64, origin: Vertex) -> [Vertex; 8] {
    let o = origin;
    [
        Vertex::new(o.x, o.y, o.z),
        Vertex::new(o.x + edge, o.y, o.z),
        Vertex::new(o.x + edge, o.y + edge, o.z),
        Vertex::new(o.x, o.y + edge, o.z),
        Vertex::new(o.x, o.y, o.z + edge),
        Vertex::new(o.x + edge, o.y, o.z + edge),
        Vertex::new(o.x + edge, o.y + edge, o.z + edge),
        Vertex::new(o.x, o.y + edge, o.z + edge),
    ]
}

/// Closed, outward-wound cube of 12 triangles
pub fn cube_mesh(edge: f64, origin: Vertex) -> Mesh {
    let c = cube_corners(edge, origin);
    CUBE_QUADS
        .iter()
        .flat_map(|&[a, b, d, e]| {
            [
                Triangle::new(c[a], c[b], c[d]),
                Triangle::new(c[a], c[d], c[e]),
            ]
        })
        .collect()
}

/// Binary STL bytes for a mesh
pub fn binary_stl(mesh: &Mesh) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data[..16].copy_from_slice(b"binary test part");
    data.extend_from_slice(&(mesh.len() as u32).to_le_bytes());
    for triangle in &mesh.triangles {
        data.extend_from_slice(&[0u8; 12]);
        for v in &triangle.vertices {
            for c in [v.x, v.y, v.z] {
                data.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        data.extend_from_slice(&[0u8; 2]);
    }
    data
}

/// ASCII STL bytes for a mesh
///
/// The solid name is long enough that byte 80 stays printable.
pub fn ascii_stl(mesh: &Mesh) -> Vec<u8> {
    let mut text = format!("solid {}\n", "test_part_".repeat(10));
    for triangle in &mesh.triangles {
        text.push_str("  facet normal 0 0 0\n    outer loop\n");
        for v in &triangle.vertices {
            text.push_str(&format!("      vertex {:e} {:e} {:e}\n", v.x, v.y, v.z));
        }
        text.push_str("    endloop\n  endfacet\n");
    }
    text.push_str("endsolid test_part\n");
    text.into_bytes()
}

/// OBJ bytes for a cube written with quad faces
pub fn cube_obj(edge: f64) -> Vec<u8> {
    let mut text = String::from("# cube\no cube\n");
    for v in cube_corners(edge, Vertex::default()) {
        text.push_str(&format!("v {} {} {}\n", v.x, v.y, v.z));
    }
    text.push_str("vn 0 0 1\n");
    for quad in CUBE_QUADS {
        let tokens: Vec<String> = quad.iter().map(|i| format!("{}//1", i + 1)).collect();
        text.push_str(&format!("f {}\n", tokens.join(" ")));
    }
    text.into_bytes()
}

/// 3MF model part XML for a cube
///
/// `prefix` is the namespace prefix used for every element, empty for the
/// default namespace. Coordinates are divided by `unit_scale` so that the
/// cube keeps its physical size in the declared unit.
pub fn cube_model_xml(edge_mm: f64, unit: &str, unit_scale: f64, prefix: &str) -> String {
    let p = if prefix.is_empty() {
        String::new()
    } else {
        format!("{}:", prefix)
    };
    let ns_attr = if prefix.is_empty() {
        "xmlns=\"http://schemas.microsoft.com/3dmanufacturing/core/2015/02\"".to_string()
    } else {
        format!(
            "xmlns:{}=\"http://schemas.microsoft.com/3dmanufacturing/core/2015/02\"",
            prefix
        )
    };

    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<{p}model unit=\"{unit}\" xml:lang=\"en-US\" {ns_attr}>\n<{p}resources>\n<{p}object id=\"1\" type=\"model\">\n<{p}mesh>\n<{p}vertices>\n"
    );
    for v in cube_corners(edge_mm / unit_scale, Vertex::default()) {
        xml.push_str(&format!(
            "<{p}vertex x=\"{}\" y=\"{}\" z=\"{}\"/>\n",
            v.x, v.y, v.z
        ));
    }
    xml.push_str(&format!("</{p}vertices>\n<{p}triangles>\n"));
    for [a, b, c, d] in CUBE_QUADS {
        xml.push_str(&format!("<{p}triangle v1=\"{a}\" v2=\"{b}\" v3=\"{c}\"/>\n"));
        xml.push_str(&format!("<{p}triangle v1=\"{a}\" v2=\"{c}\" v3=\"{d}\"/>\n"));
    }
    xml.push_str(&format!(
        "</{p}triangles>\n</{p}mesh>\n</{p}object>\n</{p}resources>\n<{p}build>\n<{p}item objectid=\"1\"/>\n</{p}build>\n</{p}model>\n"
    ));
    xml
}

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

/// Package relationships pointing at a model part
pub fn rels_for(target: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/{}" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#,
        target
    )
}

/// Build a ZIP archive from (name, contents) entries
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default();

    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap();
    buffer
}

/// A standard 3MF package holding one model part
pub fn threemf_package(model_xml: &str) -> Vec<u8> {
    let rels = rels_for("3D/3dmodel.model");
    zip_archive(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", rels.as_bytes()),
        ("3D/3dmodel.model", model_xml.as_bytes()),
    ])
}
