//! Quote pipeline: parse, fall back, estimate, price, round
//!
//! Parsing is the only step that can fail for reasons outside the caller's
//! control. When it does, the volume is estimated from the file size so that
//! a quote is still produced. Only an unusable fallback volume, non-finite
//! downstream values, an unsupported extension or invalid settings end in an
//! error.

use crate::config::QuoteConfig;
use crate::error::{Error, Result};
use crate::estimate;
use crate::model::{PriceBreakdown, PrintEstimate, PrintSettings, VolumeSource};
use crate::parser::{self, Geometry};
use crate::pricing;
use tracing::{debug, info, warn};

/// Bytes per megabyte for the file-size fallback
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Result of trying to obtain geometry from a model file
#[derive(Debug)]
pub enum ParseOutcome {
    /// Geometry with a positive, finite volume
    Parsed(Geometry),
    /// Parsing failed; the volume was estimated from the file size
    Fallback {
        /// Estimated volume in cm³
        volume_cm3: f64,
        /// The parse error that triggered the fallback
        cause: Error,
    },
    /// No volume can be quoted
    Failed(Error),
}

impl ParseOutcome {
    /// Parse a model file and classify the result
    ///
    /// Parser errors and geometry without a usable volume become
    /// [`ParseOutcome::Fallback`]. An unsupported extension and an unusable
    /// fallback volume become [`ParseOutcome::Failed`].
    pub fn from_bytes(filename: &str, data: &[u8], config: &QuoteConfig) -> Self {
        match parser::parse_model(filename, data) {
            Ok(geometry) => match check_geometry(&geometry) {
                Ok(()) => ParseOutcome::Parsed(geometry),
                Err(cause) => Self::fallback(filename, data.len(), cause, config),
            },
            Err(e) if e.is_parse_failure() => Self::fallback(filename, data.len(), e, config),
            Err(e) => ParseOutcome::Failed(e),
        }
    }

    fn fallback(filename: &str, byte_len: usize, cause: Error, config: &QuoteConfig) -> Self {
        let volume_cm3 = fallback_volume(byte_len, config);
        if !volume_cm3.is_finite() || volume_cm3 <= 0.0 {
            return ParseOutcome::Failed(Error::EstimationFailed(format!(
                "file-size fallback volume for '{}' is unusable (got {}) after: {}",
                filename, volume_cm3, cause
            )));
        }

        warn!(
            "Could not read geometry from {} ({}), using file-size volume {:.3} cm³",
            filename, cause, volume_cm3
        );
        ParseOutcome::Fallback { volume_cm3, cause }
    }

    /// The quoted volume and where it came from
    pub fn volume(&self) -> Result<(f64, VolumeSource)> {
        match self {
            ParseOutcome::Parsed(geometry) => {
                let source = match geometry {
                    Geometry::Mesh(_) => VolumeSource::Mesh,
                    Geometry::PointCloud(_) => VolumeSource::BoundingBox,
                };
                Ok((geometry.volume_cm3(), source))
            }
            ParseOutcome::Fallback { volume_cm3, .. } => {
                Ok((*volume_cm3, VolumeSource::FileSizeFallback))
            }
            ParseOutcome::Failed(e) => Err(Error::EstimationFailed(e.to_string())),
        }
    }

    /// Whether the file-size fallback was taken
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }
}

/// Reject geometry that cannot be quoted
fn check_geometry(geometry: &Geometry) -> Result<()> {
    if let Geometry::Mesh(mesh) = geometry {
        if mesh.is_empty() {
            return Err(Error::NoGeometryData("model contains no triangles".to_string()));
        }
    }

    let volume = geometry.volume_cm3();
    if !volume.is_finite() || volume <= 0.0 {
        return Err(Error::NoGeometryData(format!(
            "model encloses no volume (got {} cm³)",
            volume
        )));
    }

    Ok(())
}

/// Volume in cm³ estimated from a file's size
pub fn fallback_volume(byte_len: usize, config: &QuoteConfig) -> f64 {
    let megabytes = byte_len as f64 / BYTES_PER_MB;
    (megabytes * config.fallback_cm3_per_mb).max(config.fallback_min_cm3)
}

/// A model file parsed once and quoted under any number of settings
///
/// Quoting a prepared model gives exactly the same result as calling
/// [`crate::estimate_print`] with the original bytes.
///
/// # Example
///
/// ```no_run
/// use printquote::{PreparedModel, PrintSettings};
///
/// # fn main() -> printquote::Result<()> {
/// let bytes = std::fs::read("part.stl")?;
/// let model = PreparedModel::from_bytes("part.stl", &bytes)?;
/// for quantity in [1, 5, 10] {
///     let quote = model.estimate(&PrintSettings::new().with_quantity(quantity))?;
///     println!("{} parts: ${:.2}", quantity, quote.price.total);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedModel {
    volume_cm3: f64,
    volume_source: VolumeSource,
    triangle_count: usize,
}

impl PreparedModel {
    /// Parse a model file using the standard fallback configuration
    pub fn from_bytes(filename: &str, data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_config(filename, data, QuoteConfig::standard())
    }

    /// Parse a model file
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` for an unknown extension, `EstimationFailed` when
    /// not even the file-size fallback yields a usable volume.
    pub fn from_bytes_with_config(filename: &str, data: &[u8], config: &QuoteConfig) -> Result<Self> {
        let outcome = ParseOutcome::from_bytes(filename, data, config);
        if let ParseOutcome::Failed(e) = outcome {
            return Err(e);
        }

        let triangle_count = match &outcome {
            ParseOutcome::Parsed(geometry) => geometry.triangle_count(),
            _ => 0,
        };
        let (volume_cm3, volume_source) = outcome.volume()?;

        info!(
            "Prepared {}: {:.3} cm³ from {:?} ({} triangles)",
            filename, volume_cm3, volume_source, triangle_count
        );

        Ok(Self {
            volume_cm3,
            volume_source,
            triangle_count,
        })
    }

    /// Unrounded volume of one part in cm³
    pub fn volume_cm3(&self) -> f64 {
        self.volume_cm3
    }

    /// How the volume was obtained
    pub fn volume_source(&self) -> VolumeSource {
        self.volume_source
    }

    /// Triangles decoded from the file, zero for point clouds and fallbacks
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Quote this model with the standard rates
    pub fn estimate(&self, settings: &PrintSettings) -> Result<PrintEstimate> {
        self.estimate_with_config(settings, QuoteConfig::standard())
    }

    /// Quote this model
    ///
    /// # Errors
    ///
    /// `InvalidSettings` when the settings are out of range, and
    /// `EstimationFailed` when any derived value is not finite.
    pub fn estimate_with_config(
        &self,
        settings: &PrintSettings,
        config: &QuoteConfig,
    ) -> Result<PrintEstimate> {
        settings.validate()?;
        build_estimate(self.volume_cm3, self.volume_source, settings, config)
    }
}

/// Turn a volume into a rounded, validated estimate
fn build_estimate(
    volume_cm3: f64,
    volume_source: VolumeSource,
    settings: &PrintSettings,
    config: &QuoteConfig,
) -> Result<PrintEstimate> {
    let usage = estimate::estimate_usage(volume_cm3, settings);
    let price = pricing::price_breakdown(usage.minutes_per_unit, settings, config);

    ensure_finite("volume", volume_cm3)?;
    ensure_finite("filament grams", usage.filament_grams)?;
    ensure_finite("filament meters", usage.filament_meters)?;
    ensure_finite("print minutes", usage.total_minutes)?;
    ensure_finite("manufacturing price", price.manufacturing)?;
    ensure_finite("delivery price", price.delivery)?;

    debug!(
        "Usage: {:.3} g, {:.3} m, {:.2} min/part; price ${:.4} + ${:.4}",
        usage.filament_grams,
        usage.filament_meters,
        usage.minutes_per_unit,
        price.manufacturing,
        price.delivery
    );

    let manufacturing = round2(price.manufacturing);
    let delivery = round2(price.delivery);

    Ok(PrintEstimate {
        volume_cm3: round1(volume_cm3),
        filament_grams: round1(usage.filament_grams),
        filament_meters: round1(usage.filament_meters),
        estimated_minutes: round1(usage.total_minutes),
        price: PriceBreakdown {
            manufacturing,
            delivery,
            total: round2(manufacturing + delivery),
        },
        volume_source,
    })
}

fn ensure_finite(quantity: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::non_finite(quantity, value))
    }
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to whole cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Volume of a model file in cm³, without the file-size fallback
///
/// # Errors
///
/// Every parser error is returned as-is.
pub fn compute_volume(filename: &str, data: &[u8]) -> Result<f64> {
    let geometry = parser::parse_model(filename, data)?;
    Ok(geometry.volume_cm3())
}

/// Quote a model file with the standard rates
pub fn estimate_print(filename: &str, data: &[u8], settings: &PrintSettings) -> Result<PrintEstimate> {
    estimate_print_with_config(filename, data, settings, QuoteConfig::standard())
}

/// Quote a model file
///
/// Settings are validated before the file is parsed.
///
/// # Errors
///
/// `InvalidSettings`, `UnsupportedFormat` and `EstimationFailed`. Parser
/// errors never surface here; they select the file-size fallback.
pub fn estimate_print_with_config(
    filename: &str,
    data: &[u8],
    settings: &PrintSettings,
    config: &QuoteConfig,
) -> Result<PrintEstimate> {
    settings.validate()?;
    PreparedModel::from_bytes_with_config(filename, data, config)?
        .estimate_with_config(settings, config)
}
