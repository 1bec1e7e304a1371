//! Filament and print time estimation
//!
//! Both models work from the enclosed volume alone and approximate the part
//! as a prism of estimated height and base area. The mass model and the time
//! model derive that height differently; the two heuristics are kept apart
//! because quoted prices depend on each of them as-is.

use crate::mesh_ops::MM3_PER_CM3;
use crate::model::PrintSettings;

/// Extrusion line width in mm
pub const LINE_WIDTH_MM: f64 = 0.4;

/// Number of perimeter walls
pub const PERIMETER_COUNT: f64 = 2.0;

/// Solid layers at the top and at the bottom
pub const TOP_BOTTOM_LAYERS: f64 = 3.0;

/// Allowance for purge, supports and failed starts (8%)
pub const WASTE_FACTOR: f64 = 1.08;

/// Filament radius in mm (1.75 mm filament)
pub const FILAMENT_RADIUS_MM: f64 = 0.875;

/// Smallest height the mass model assumes, in mm
pub const MIN_MASS_HEIGHT_MM: f64 = 0.1;

/// Scale applied to the time model's height estimate
pub const TIME_HEIGHT_SCALE: f64 = 0.8;

/// Perimeter print speed in mm/s
pub const PERIMETER_SPEED_MM_S: f64 = 50.0;

/// Infill print speed in mm/s
pub const INFILL_SPEED_MM_S: f64 = 60.0;

/// First layer print speed in mm/s
pub const FIRST_LAYER_SPEED_MM_S: f64 = 20.0;

/// Time spent on each layer change in seconds
pub const LAYER_CHANGE_SECONDS: f64 = 5.0;

/// Safety margin applied to the computed print time
pub const TIME_BUFFER: f64 = 1.2;

/// Unrounded material and time usage for one quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageEstimate {
    /// Filament mass for all parts in grams
    pub filament_grams: f64,
    /// Filament length for all parts in meters
    pub filament_meters: f64,
    /// Print time of a single part in minutes
    pub minutes_per_unit: f64,
    /// Print time of all parts in minutes
    pub total_minutes: f64,
}

/// Estimate filament and time for a part volume
///
/// `volume_cm3` must be positive; a zero volume produces NaN in the time
/// model, which the quote pipeline reports as a failed estimate.
pub fn estimate_usage(volume_cm3: f64, settings: &PrintSettings) -> UsageEstimate {
    let filament_grams = filament_grams(volume_cm3, settings);
    let minutes_per_unit = print_minutes_per_unit(volume_cm3, settings);

    UsageEstimate {
        filament_grams,
        filament_meters: filament_meters(filament_grams, settings.material.density()),
        minutes_per_unit,
        total_minutes: minutes_per_unit * f64::from(settings.quantity),
    }
}

/// Filament mass in grams for all parts
pub fn filament_grams(volume_cm3: f64, settings: &PrintSettings) -> f64 {
    let volume_mm3 = volume_cm3 * MM3_PER_CM3;
    let height = volume_mm3.cbrt().max(MIN_MASS_HEIGHT_MM);
    let base_area = volume_mm3 / height;
    let perimeter = perimeter_estimate(base_area);

    let walls = perimeter * height * LINE_WIDTH_MM * PERIMETER_COUNT;
    let caps = base_area * settings.layer_height * TOP_BOTTOM_LAYERS * 2.0;
    let shell = walls + caps;
    let infill = ((volume_mm3 - shell) * settings.infill_fraction()).max(0.0);

    let material_cm3 = (shell + infill) * WASTE_FACTOR / MM3_PER_CM3;
    material_cm3 * settings.material.density() * f64::from(settings.quantity)
}

/// Filament length in meters for a mass of material
pub fn filament_meters(grams: f64, density: f64) -> f64 {
    let volume_mm3 = grams / density * MM3_PER_CM3;
    let cross_section = std::f64::consts::PI * FILAMENT_RADIUS_MM * FILAMENT_RADIUS_MM;
    volume_mm3 / cross_section / 1000.0
}

/// Print time in minutes for a single part
pub fn print_minutes_per_unit(volume_cm3: f64, settings: &PrintSettings) -> f64 {
    let volume_mm3 = volume_cm3 * MM3_PER_CM3;
    let height = (volume_mm3 * 1000.0).cbrt() * TIME_HEIGHT_SCALE;
    let base_area = volume_mm3 / height;
    let perimeter = perimeter_estimate(base_area);
    let infill_area = base_area * settings.infill_fraction();
    let layers = (height / settings.layer_height).ceil();

    let perimeter_seconds = perimeter * layers / PERIMETER_SPEED_MM_S;
    let infill_seconds = infill_area * layers / LINE_WIDTH_MM / INFILL_SPEED_MM_S;
    let first_layer_seconds = perimeter / FIRST_LAYER_SPEED_MM_S;
    let layer_change_seconds = layers * LAYER_CHANGE_SECONDS;

    let seconds = perimeter_seconds + infill_seconds + first_layer_seconds + layer_change_seconds;
    seconds / 60.0 * TIME_BUFFER
}

/// Print time in minutes for all parts
pub fn print_minutes(volume_cm3: f64, settings: &PrintSettings) -> f64 {
    print_minutes_per_unit(volume_cm3, settings) * f64::from(settings.quantity)
}

/// Perimeter of a square with the given area
fn perimeter_estimate(base_area: f64) -> f64 {
    4.0 * base_area.sqrt()
}
