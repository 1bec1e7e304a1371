//! Quote records returned to the caller

/// Where the quoted volume came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VolumeSource {
    /// Signed-volume summation over a parsed triangle mesh
    Mesh,
    /// Bounding box of a face-less OBJ point cloud
    BoundingBox,
    /// The file could not be parsed; volume was estimated from its size
    FileSizeFallback,
}

/// Price breakdown in dollars, rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceBreakdown {
    /// Printing cost for all parts, after quantity discount
    pub manufacturing: f64,
    /// Courier cost, zero for pickup
    pub delivery: f64,
    /// Manufacturing plus delivery
    pub total: f64,
}

/// Final, rounded estimate for one file and one set of settings
///
/// Volume, mass, length and time carry one decimal; money carries two.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrintEstimate {
    /// Enclosed volume of one part in cm³
    pub volume_cm3: f64,
    /// Filament mass for all parts in grams
    pub filament_grams: f64,
    /// Filament length for all parts in meters
    pub filament_meters: f64,
    /// Print time for all parts in minutes
    pub estimated_minutes: f64,
    /// Prices
    pub price: PriceBreakdown,
    /// How the volume was obtained
    pub volume_source: VolumeSource,
}

impl PrintEstimate {
    /// Whether the volume came from the file-size fallback rather than geometry
    pub fn is_fallback(&self) -> bool {
        self.volume_source == VolumeSource::FileSizeFallback
    }
}
