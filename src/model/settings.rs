//! Print settings supplied by the caller for one quote

use std::fmt;
use std::str::FromStr;

use crate::config;
use crate::error::{Error, Result};

/// Filament material
///
/// Each material has a fixed density, see [`config::MATERIAL_DENSITIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Material {
    /// Polylactic acid
    #[default]
    Pla,
    /// Polyethylene terephthalate glycol
    Petg,
    /// Acrylonitrile butadiene styrene
    Abs,
    /// Thermoplastic polyurethane
    Tpu,
}

impl Material {
    /// Lower-case key used in order forms
    pub fn key(&self) -> &'static str {
        match self {
            Material::Pla => "pla",
            Material::Petg => "petg",
            Material::Abs => "abs",
            Material::Tpu => "tpu",
        }
    }

    /// Resolve a material key, case-insensitively
    ///
    /// Unknown keys resolve to [`Material::Pla`], so an unknown material is
    /// priced with PLA's density.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "petg" => Material::Petg,
            "abs" => Material::Abs,
            "tpu" => Material::Tpu,
            _ => Material::Pla,
        }
    }

    /// Density in g/cm³
    pub fn density(&self) -> f64 {
        config::material_density(*self)
    }
}

impl From<&str> for Material {
    fn from(key: &str) -> Self {
        Material::from_key(key)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How urgently the order is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpeedClass {
    /// Jump the queue entirely
    Instant,
    /// Prioritized
    Fast,
    /// Normal queue position
    #[default]
    Regular,
}

impl SpeedClass {
    /// Lower-case key used in order forms
    pub fn key(&self) -> &'static str {
        match self {
            SpeedClass::Instant => "instant",
            SpeedClass::Fast => "fast",
            SpeedClass::Regular => "regular",
        }
    }
}

impl FromStr for SpeedClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instant" => Ok(SpeedClass::Instant),
            "fast" => Ok(SpeedClass::Fast),
            "regular" => Ok(SpeedClass::Regular),
            other => Err(Error::invalid_setting(
                "speed",
                format!(
                    "unknown speed class '{}'. Must be one of: instant, fast, regular",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How the finished parts reach the customer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DeliveryMode {
    /// Customer collects the order
    #[default]
    Pickup,
    /// Courier delivery
    Delivery {
        /// One-way distance in km, as resolved by the caller's geocoder
        distance_km: Option<f64>,
    },
}

impl DeliveryMode {
    /// Delivery over a known one-way distance
    pub fn delivery(distance_km: f64) -> Self {
        DeliveryMode::Delivery {
            distance_km: Some(distance_km),
        }
    }

    /// The distance to price, if this is a delivery with a known distance
    pub fn distance_km(&self) -> Option<f64> {
        match self {
            DeliveryMode::Pickup => None,
            DeliveryMode::Delivery { distance_km } => *distance_km,
        }
    }
}

/// Print settings for one quote
///
/// Settings are immutable for the duration of a computation. Use the
/// builder-style setters to derive variants.
///
/// # Example
///
/// ```
/// use printquote::{Material, PrintSettings, SpeedClass};
///
/// let settings = PrintSettings::new()
///     .with_material(Material::Petg)
///     .with_infill_percent(40.0)
///     .with_quantity(5)
///     .with_speed(SpeedClass::Fast);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrintSettings {
    /// Filament material
    pub material: Material,
    /// Infill density, 0-100
    pub infill_percent: f64,
    /// Layer height in mm
    pub layer_height: f64,
    /// Number of identical parts
    pub quantity: u32,
    /// Queue priority
    pub speed: SpeedClass,
    /// Pickup or delivery
    pub delivery: DeliveryMode,
}

impl PrintSettings {
    /// Default settings: PLA, 20% infill, 0.2 mm layers, one part, regular
    /// speed, pickup
    pub fn new() -> Self {
        Self {
            material: Material::Pla,
            infill_percent: 20.0,
            layer_height: 0.2,
            quantity: 1,
            speed: SpeedClass::Regular,
            delivery: DeliveryMode::Pickup,
        }
    }

    /// Set the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Set the infill percentage
    pub fn with_infill_percent(mut self, infill_percent: f64) -> Self {
        self.infill_percent = infill_percent;
        self
    }

    /// Set the layer height in mm
    pub fn with_layer_height(mut self, layer_height: f64) -> Self {
        self.layer_height = layer_height;
        self
    }

    /// Set the number of parts
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the speed class
    pub fn with_speed(mut self, speed: SpeedClass) -> Self {
        self.speed = speed;
        self
    }

    /// Set the delivery mode
    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    /// Infill as a fraction in 0.0-1.0
    pub fn infill_fraction(&self) -> f64 {
        self.infill_percent / 100.0
    }

    /// Check that every field is within its documented range
    pub fn validate(&self) -> Result<()> {
        if !self.infill_percent.is_finite() || !(0.0..=100.0).contains(&self.infill_percent) {
            return Err(Error::invalid_setting(
                "infill_percent",
                format!("must be within 0-100 (got {})", self.infill_percent),
            ));
        }

        if !self.layer_height.is_finite() || self.layer_height <= 0.0 {
            return Err(Error::invalid_setting(
                "layer_height",
                format!("must be a positive number of mm (got {})", self.layer_height),
            ));
        }

        if self.quantity == 0 {
            return Err(Error::invalid_setting("quantity", "must be at least 1"));
        }

        if let Some(distance) = self.delivery.distance_km() {
            if !distance.is_finite() || distance < 0.0 {
                return Err(Error::invalid_setting(
                    "distance_km",
                    format!("must be a non-negative number of km (got {})", distance),
                ));
            }
        }

        Ok(())
    }
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self::new()
    }
}
