//! # printquote
//!
//! Instant manufacturing quotes for 3D printing.
//!
//! This library reads a model file (STL, OBJ or 3MF) into a triangle soup,
//! computes its enclosed volume, and turns that volume plus a set of print
//! settings into filament usage, print time and a price.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Binary and ASCII STL, Wavefront OBJ, and 3MF (ZIP/OPC container)
//! - Centroid-referenced signed volume, robust to far-from-origin models
//! - Always quotes something: unreadable files fall back to a file-size
//!   volume estimate
//! - Configurable rates, discounts and delivery pricing
//!
//! ## Example
//!
//! ```no_run
//! use printquote::{Material, PrintSettings, estimate_print};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("bracket.stl")?;
//! let settings = PrintSettings::new()
//!     .with_material(Material::Petg)
//!     .with_infill_percent(25.0);
//!
//! let quote = estimate_print("bracket.stl", &bytes, &settings)?;
//! println!("{} g, {} min, ${:.2}", quote.filament_grams, quote.estimated_minutes, quote.price.total);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod estimate;
pub mod mesh_ops;
pub mod model;
pub mod opc;
pub mod parser;
pub mod pricing;
pub mod quote;

pub use config::QuoteConfig;
pub use error::{Error, Result};
pub use model::{
    DeliveryMode, Material, Mesh, PriceBreakdown, PrintEstimate, PrintSettings, SpeedClass,
    Triangle, Vertex, VolumeSource,
};
pub use parser::{Geometry, MeshFormat, parse_model};
pub use quote::{
    ParseOutcome, PreparedModel, compute_volume, estimate_print, estimate_print_with_config,
};

use std::path::Path;

/// Quote a model file on disk with the standard rates
///
/// The file name is taken from the path and selects the decoder.
///
/// # Errors
///
/// `Io` when the file cannot be read, otherwise as [`estimate_print`].
///
/// # Example
///
/// ```no_run
/// use printquote::{PrintSettings, estimate_file};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let quote = estimate_file("part.3mf", &PrintSettings::new())?;
/// println!("Total: ${:.2}", quote.price.total);
/// # Ok(())
/// # }
/// ```
pub fn estimate_file<P: AsRef<Path>>(path: P, settings: &PrintSettings) -> Result<PrintEstimate> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    estimate_print(&filename, &data, settings)
}
