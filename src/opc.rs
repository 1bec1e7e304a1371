//! OPC (Open Packaging Conventions) access for 3MF files
//!
//! 3MF files are ZIP archives following the OPC standard. This module only
//! reads: it lists entries, loads them, and locates the 3D model part.
//! Slicer exports are often not fully OPC compliant, so no package structure
//! is required beyond a readable ZIP directory.

use crate::error::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Read, Seek};
use tracing::debug;
use urlencoding::decode;
use zip::ZipArchive;

/// Package relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Extension of 3MF model parts
pub const MODEL_EXTENSION: &str = ".model";

/// Represents an OPC package (3MF file)
pub struct Package<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from a reader
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Names of all entries, in archive order
    pub fn file_names(&self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }

    /// Check if an entry exists
    pub fn has_file(&mut self, name: &str) -> bool {
        self.archive.by_name(name).is_ok()
    }

    /// Uncompressed size of an entry
    pub fn file_size(&mut self, name: &str) -> Option<u64> {
        self.archive.by_name(name).ok().map(|f| f.size())
    }

    /// Get an entry as text
    pub fn get_file(&mut self, name: &str) -> Result<String> {
        let bytes = self.get_file_binary(name)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Get an entry as binary data
    pub fn get_file_binary(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// First entry whose name ends with one of the given extensions
    ///
    /// Extensions are compared case-insensitively and should include the dot.
    pub fn find_by_extension(&self, extensions: &[&str]) -> Option<String> {
        self.archive
            .file_names()
            .find(|name| {
                let lower = name.to_ascii_lowercase();
                extensions.iter().any(|ext| lower.ends_with(ext))
            })
            .map(String::from)
    }

    /// Locate the 3D model part
    ///
    /// The part named by the package's model relationship wins when it
    /// exists; otherwise the first `.model` entry is used.
    pub fn find_model_part(&mut self) -> Option<String> {
        match self.discover_model_path() {
            Ok(Some(path)) if self.has_file(&path) => {
                debug!("Model part from relationships: {}", path);
                return Some(path);
            }
            Ok(_) => {}
            Err(e) => debug!("Ignoring unreadable package relationships: {}", e),
        }

        self.find_by_extension(&[MODEL_EXTENSION])
    }

    /// Read the model part path from `_rels/.rels`
    ///
    /// Returns `Ok(None)` when the package has no relationships file or no
    /// model relationship. Targets are percent-decoded and made relative to
    /// the archive root.
    fn discover_model_path(&mut self) -> Result<Option<String>> {
        if !self.has_file(RELS_PATH) {
            return Ok(None);
        }
        let rels_content = self.get_file(RELS_PATH)?;

        let mut reader = Reader::from_str(&rels_content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut target = None;
                    let mut rel_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"Target" => target = Some(value),
                            b"Type" => rel_type = Some(value),
                            _ => {}
                        }
                    }

                    if let (Some(t), Some(MODEL_REL_TYPE)) = (target, rel_type.as_deref()) {
                        let decoded = decode(&t)
                            .map(|s| s.into_owned())
                            .unwrap_or_else(|_| t.clone());
                        let path = decoded
                            .strip_prefix('/')
                            .map(String::from)
                            .unwrap_or(decoded);
                        return Ok(Some(path));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(None)
    }
}
