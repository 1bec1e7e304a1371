//! Error types for model parsing and print estimation
//!
//! All errors carry an error code so callers can categorize failures without
//! matching on message text.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: File format and XML errors
//! - **E3xxx**: Geometry errors
//! - **E4xxx**: Settings and estimation errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading file
//! - `E1002`: ZIP archive format error
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Unsupported file format (unknown extension)
//! - `E2004`: Invalid file format (truncated or corrupt)
//! - `E3001`: No geometry data (no parseable vertices)
//! - `E3002`: No mesh data (3MF archive without locatable mesh)
//! - `E4001`: Invalid print settings
//! - `E4002`: Estimation failed (non-positive or non-finite result)

use std::io;
use thiserror::Error;

/// Result type for parsing and estimation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a model or computing a quote
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading the file
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted or truncated 3MF archive
    /// - Unsupported compression method
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error inside a 3MF model part
    ///
    /// **Error Code**: E2001
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// The file extension does not name a supported format
    ///
    /// **Error Code**: E2003
    ///
    /// **Suggestions**:
    /// - Export the model as STL, OBJ or 3MF
    #[error("[E2003] Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The buffer is too short or its header is corrupt
    ///
    /// **Error Code**: E2004
    #[error("[E2004] Invalid format: {0}")]
    InvalidFormat(String),

    /// No parseable vertices were found
    ///
    /// **Error Code**: E3001
    #[error("[E3001] No geometry data: {0}")]
    NoGeometryData(String),

    /// A 3MF archive contained no locatable mesh content
    ///
    /// **Error Code**: E3002
    ///
    /// **Common Causes**:
    /// - Archive holds only metadata or thumbnails
    /// - Mesh elements use an unexpected namespace and no fallback entry exists
    #[error("[E3002] No mesh data: {0}")]
    NoMeshData(String),

    /// Print settings are out of range
    ///
    /// **Error Code**: E4001
    ///
    /// **Suggestions**:
    /// - Infill must be within 0-100 percent
    /// - Layer height must be a positive number of millimeters
    /// - Quantity must be at least 1
    #[error("[E4001] Invalid print settings: {0}")]
    InvalidSettings(String),

    /// No sensible estimate could be produced
    ///
    /// **Error Code**: E4002
    ///
    /// Raised when even the file-size fallback yields a non-positive or
    /// non-finite volume, or when any derived quantity is non-finite.
    #[error("[E4002] Estimation failed: {0}")]
    EstimationFailed(String),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create an UnsupportedFormat error for a file name
    ///
    /// # Arguments
    /// * `filename` - The file name whose extension was not recognized
    pub fn unsupported_extension(filename: &str) -> Self {
        Error::UnsupportedFormat(format!(
            "'{}' does not have a .stl, .obj or .3mf extension",
            filename
        ))
    }

    /// Create an InvalidFormat error with context about which format is invalid
    ///
    /// # Arguments
    /// * `context` - What format or structure is invalid (e.g., "STL")
    /// * `message` - Description of the error
    pub fn invalid_format_context(context: &str, message: &str) -> Self {
        Error::InvalidFormat(format!("{}: {}", context, message))
    }

    /// Create an InvalidSettings error naming the offending field
    ///
    /// # Arguments
    /// * `field` - The settings field (e.g., "layer_height")
    /// * `message` - What is wrong with its value
    pub fn invalid_setting(field: &str, message: impl std::fmt::Display) -> Self {
        Error::InvalidSettings(format!("{}: {}", field, message))
    }

    /// Create an EstimationFailed error for a non-finite or non-positive quantity
    ///
    /// # Arguments
    /// * `quantity` - Name of the derived value (e.g., "filament grams")
    /// * `value` - The offending value
    pub fn non_finite(quantity: &str, value: f64) -> Self {
        Error::EstimationFailed(format!(
            "{} is not a usable number (got {})",
            quantity, value
        ))
    }

    /// Whether the error comes from reading the model file rather than from
    /// the caller's input
    ///
    /// Parser-level errors are the ones the quoting pipeline is allowed to
    /// replace with the file-size volume fallback.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Zip(_)
                | Error::Xml(_)
                | Error::XmlAttr(_)
                | Error::InvalidFormat(_)
                | Error::NoGeometryData(_)
                | Error::NoMeshData(_)
        )
    }
}
